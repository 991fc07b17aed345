//! Seekable stream traits
//!
//! This module provides unified traits for streams that support both
//! reading (or writing) and seeking operations.

use std::io::{Read, Seek, Write};

/// Trait for readers that can both read and seek
///
/// This trait combines the Read and Seek traits for use with
/// various readers throughout the application.
pub trait SeekableReader: Read + Seek {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek> SeekableReader for T {}

/// Trait for writers that can also seek
///
/// The TIFF writer needs to backpatch offsets into already written
/// regions, so plain `Write` is not enough.
pub trait SeekableStream: Write + Seek {}

impl<T: Write + Seek> SeekableStream for T {}
