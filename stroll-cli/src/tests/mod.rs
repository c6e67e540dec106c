//! Shared test harness modules for the Stroll CLI.

use super::*;

mod helpers;
mod street_view_steps;
