// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire protocol for driving a `scanvas_core` scene over a byte stream.
//!
//! Commands start with the category byte `23`, a sub-protocol byte (`0` for
//! legacy system commands, `30` for primitive commands) and an opcode.
//! Fields are little-endian: IDs, counts and sizes are `u16`, coordinates
//! `i16` and colors one byte. Any byte that does not start a command is text
//! for the active terminal.
//!
//! - [`Dispatcher`] is the incremental parser. It implements
//!   [`CommandSink`](scanvas_core::backend::CommandSink), so the compositor
//!   can feed it one byte at a time between scan lines.
//! - [`Command`] and [`SystemCommand`] are the typed commands, with
//!   [`Command::apply`] running one against a scene and
//!   [`Command::encode`] producing its bytes.
//! - [`table`] holds the length table used to find where each command ends.
//!
//! ```
//! use scanvas_core::backend::{CommandSink, FeedOutcome, Opcode};
//! use scanvas_core::color::Color;
//! use scanvas_core::display::DisplayConfig;
//! use scanvas_core::geometry::Point;
//! use scanvas_core::scene::{PrimitiveFlags, PrimitiveId, Scene, SceneConfig};
//! use scanvas_protocol::{Command, Dispatcher, ShapeCommand};
//!
//! let mut scene = Scene::new(DisplayConfig::qvga_320x240(), SceneConfig::compact());
//! let mut dispatcher = Dispatcher::new();
//! let bytes = Command::Create {
//!     id: PrimitiveId(1),
//!     parent: PrimitiveId::ROOT,
//!     flags: PrimitiveFlags::VISIBLE,
//!     shape: ShapeCommand::Point { at: Point::new(3, 4), color: Color::WHITE },
//! }
//! .to_bytes();
//!
//! let mut last = FeedOutcome::Pending;
//! for b in bytes {
//!     last = dispatcher.feed(&mut scene, b);
//! }
//! assert_eq!(last, FeedOutcome::Dispatched(Opcode::Primitive(10)));
//! assert!(scene.is_live(PrimitiveId(1)));
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod command;
mod decode;
mod dispatch;
mod encode;
mod execute;
pub mod table;
mod wire;

pub use command::{Command, ShapeCommand, SystemCommand};
pub use decode::decode;
pub use dispatch::{Dispatcher, IgnoreSystem, SystemHandler};
