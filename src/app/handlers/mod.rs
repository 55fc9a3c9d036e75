// SPDX-License-Identifier: GPL-3.0-only

//! Message handler modules
//!
//! Handlers are grouped by concern. Each one updates the state and returns
//! the task that talks to the collaborators.

mod camera;
mod capture;
mod permissions;
mod preview;
