// SPDX-License-Identifier: GPL-3.0-or-later

//! Offline helpers for firmware builds: a generator turning peripheral
//! memory-map documents into C structure declarations, and a patcher writing
//! the boot-vector checksum of an image.

pub mod checksum;
pub mod config;
pub mod layout;
pub mod util;

#[macro_use]
extern crate log;
