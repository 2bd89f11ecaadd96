//! gdst: session-based front end for GDSII layout files
//!
//! Lists the cells of a layout, opens a cell in an external 3D viewer,
//! exports a layout to glTF and optionally uploads the result. A small
//! session file carries the selected layout between invocations so repeat
//! commands can omit it.
//!
//! Layering, outermost first:
//! - `cli`: argument parsing, dispatch, terminal output
//! - `application`: orchestration services over I/O boundary traits
//! - `domain`: entities with no I/O (cell libraries, tool invocations)
//! - `infrastructure`: GDSII driver, filesystem, subprocess and HTTP
//!   implementations plus the DI container

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
