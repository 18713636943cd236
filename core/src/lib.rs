// Copyright 2024-2026 the asdmkit collaborators
// Licensed under the MIT License.

//! Endian-aware binary stream primitives for the asdmkit crates.

pub mod io;

pub use io::{BinaryReader, BinaryWriter, ByteOrdering};
