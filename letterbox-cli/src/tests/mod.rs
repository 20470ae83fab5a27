//! Shared test harness modules for the Letterbox CLI.

use super::*;

mod helpers;
