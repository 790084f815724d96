//! Reader for the Battle.net agent's `product.db`, a protobuf `Database` message.
//!
//! Only the fields leading to an install's version string are decoded,
//! everything else is skipped by wire type.

use std::io::{Cursor, ErrorKind, Read};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{LE, ReadBytesExt};

// Database
const DATABASE_PRODUCT_INSTALL: u32 = 1;
// ProductInstall
const INSTALL_UID: u32 = 1;
const INSTALL_PRODUCT_CODE: u32 = 2;
const INSTALL_CACHED_PRODUCT_STATE: u32 = 4;
// CachedProductState
const CACHED_BASE_PRODUCT_STATE: u32 = 1;
// BaseProductState
const BASE_CURRENT_VERSION_STR: u32 = 7;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("unexpected end of data")]
    Io(#[from] std::io::Error),
    #[error("varint longer than 10 bytes")]
    VarintOverflow,
    #[error("unsupported wire type {wire_type} for field {field}")]
    UnsupportedWireType { field: u32, wire_type: u8 },
    #[error("field {field} claims {len} bytes but only {remaining} remain")]
    Truncated { field: u32, len: u64, remaining: u64 },
    #[error("field {0} is not valid utf-8")]
    InvalidUtf8(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

/// Iterates the `(field number, value)` pairs of one encoded message.
pub struct Fields<'a> {
    reader: Cursor<&'a [u8]>,
}

impl<'a> Fields<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Fields {
            reader: Cursor::new(data),
        }
    }

    fn next_field(&mut self) -> Result<Option<(u32, Field<'a>)>, WireError> {
        let data: &'a [u8] = *self.reader.get_ref();
        if self.reader.position() >= data.len() as u64 {
            return Ok(None);
        }

        let key = read_varint(&mut self.reader)?;
        let number = (key >> 3) as u32;
        let field = match (key & 0b111) as u8 {
            0 => Field::Varint(read_varint(&mut self.reader)?),
            1 => Field::Fixed64(self.reader.read_u64::<LE>()?),
            2 => {
                let len = read_varint(&mut self.reader)?;
                let start = self.reader.position();
                let remaining = data.len() as u64 - start;
                if len > remaining {
                    return Err(WireError::Truncated {
                        field: number,
                        len,
                        remaining,
                    });
                }
                self.reader.set_position(start + len);
                Field::Bytes(&data[start as usize..(start + len) as usize])
            }
            5 => Field::Fixed32(self.reader.read_u32::<LE>()?),
            wire_type => {
                return Err(WireError::UnsupportedWireType {
                    field: number,
                    wire_type,
                });
            }
        };
        Ok(Some((number, field)))
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<(u32, Field<'a>), WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.next_field();
        if item.is_err() {
            let end = self.reader.get_ref().len() as u64;
            self.reader.set_position(end);
        }
        item.transpose()
    }
}

fn read_varint<R: Read>(reader: &mut R) -> Result<u64, WireError> {
    let mut value = 0u64;
    for i in 0..10 {
        let byte = reader.read_u8()?;
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(WireError::VarintOverflow)
}

fn read_string(field: u32, bytes: &[u8]) -> Result<String, WireError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8(field))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductInstall {
    pub uid: String,
    pub product_code: String,
    /// `current_version_str` of every base product state, in file order.
    pub versions: Vec<String>,
}

impl ProductInstall {
    fn parse(data: &[u8]) -> Result<Self, WireError> {
        let mut install = ProductInstall::default();
        for field in Fields::new(data) {
            match field? {
                (INSTALL_UID, Field::Bytes(bytes)) => install.uid = read_string(INSTALL_UID, bytes)?,
                (INSTALL_PRODUCT_CODE, Field::Bytes(bytes)) => {
                    install.product_code = read_string(INSTALL_PRODUCT_CODE, bytes)?
                }
                (INSTALL_CACHED_PRODUCT_STATE, Field::Bytes(state)) => {
                    for field in Fields::new(state) {
                        if let (CACHED_BASE_PRODUCT_STATE, Field::Bytes(base)) = field? {
                            install.versions.extend(current_version(base)?);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(install)
    }
}

fn current_version(base_state: &[u8]) -> Result<Option<String>, WireError> {
    let mut version = None;
    for field in Fields::new(base_state) {
        if let (BASE_CURRENT_VERSION_STR, Field::Bytes(bytes)) = field? {
            version = Some(read_string(BASE_CURRENT_VERSION_STR, bytes)?);
        }
    }
    Ok(version)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductDb {
    pub installs: Vec<ProductInstall>,
}

impl ProductDb {
    pub fn parse(data: &[u8]) -> Result<Self, WireError> {
        let mut installs = Vec::new();
        for field in Fields::new(data) {
            if let (DATABASE_PRODUCT_INSTALL, Field::Bytes(install)) = field? {
                installs.push(ProductInstall::parse(install)?);
            }
        }
        Ok(ProductDb { installs })
    }

    /// Returns `None` if the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("could not read '{}'", path.display()));
            }
        };
        let db = ProductDb::parse(&data)
            .with_context(|| format!("malformed agent database '{}'", path.display()))?;
        Ok(Some(db))
    }

    /// First version listed for the first install of `product_code`.
    /// Empty version strings count as missing.
    pub fn version_of(&self, product_code: &str) -> Option<&str> {
        self.installs
            .iter()
            .find(|install| install.product_code == product_code)?
            .versions
            .first()
            .map(String::as_str)
            .filter(|version| !version.is_empty())
    }
}
