// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust code generation.
//!
//! Emits one self-contained module per schema: enums, a zero-copy encoder
//! and decoder per message, the schema facade, the dispatcher, and the
//! provider. Output is deterministic: declaration order in, declaration
//! order out.

use std::fmt::Write as _;

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use log::debug;

use crate::schema::{EnumDef, Field, FieldType, Message, Schema};

/// Generate the complete Rust module for `schema`.
pub fn generate(schema: &Schema) -> String {
    debug!(
        "generating {} v{}: {} messages, {} enums",
        schema.prefix,
        schema.version,
        schema.messages.len(),
        schema.enums.len()
    );
    let mut gen = Generator {
        schema,
        buf: String::with_capacity(64 * 1024),
    };
    gen.push_module_header();
    gen.push_helpers();
    gen.push_message_type_consts();
    for def in &schema.enums {
        gen.push_enum(def);
    }
    for message in &schema.messages {
        gen.push_encoder(message);
        gen.push_decoder(message);
    }
    gen.push_message_enums();
    gen.push_facade();
    gen.push_dispatcher();
    gen.push_provider();
    gen.buf
}

struct Generator<'a> {
    schema: &'a Schema,
    buf: String,
}

/// Per-type accessor helper names and widths.
fn primitive(ty: &FieldType) -> Option<(&'static str, &'static str, usize)> {
    match ty {
        FieldType::Byte => Some(("u8", "u8", 1)),
        FieldType::Char => Some(("u16", "u16", 2)),
        FieldType::Short => Some(("i16", "i16", 2)),
        FieldType::Int => Some(("i32", "i32", 4)),
        FieldType::Float => Some(("f32", "f32", 4)),
        FieldType::Long => Some(("i64", "i64", 8)),
        FieldType::Double => Some(("f64", "f64", 8)),
        FieldType::DirectBuffer | FieldType::Enum(_) => None,
    }
}

impl Generator<'_> {
    fn push_module_header(&mut self) {
        let _ = writeln!(
            self.buf,
            "// @generated by seqbus-gen from the {} schema. Do not edit.",
            self.schema.prefix
        );
        self.buf.push_str("#![allow(dead_code)]\n");
        self.buf.push_str("#![allow(unused_imports)]\n");
        self.buf.push_str("#![allow(clippy::all)]\n\n");
        self.buf.push_str(
            "use seqbus::bus::{EventHandler, MessagePublisher, PublishError};\n\
             use seqbus::codec::{header, tlv, CodecError, OptionalCache};\n\n",
        );
        let _ = writeln!(
            self.buf,
            "/// Compiled schema version.\npub const SCHEMA_VERSION: u8 = {};",
            self.schema.version
        );
        let _ = writeln!(
            self.buf,
            "/// Schema prefix.\npub const SCHEMA_PREFIX: &str = \"{}\";",
            self.schema.prefix
        );
        self.buf
            .push_str("/// Schema properties, in declaration order.\n");
        self.buf.push_str("pub const PROPERTIES: &[(&str, &str)] = &[");
        for (name, value) in &self.schema.properties {
            let _ = write!(self.buf, "(\"{}\", \"{}\"), ", name, value);
        }
        self.buf.push_str("];\n\n");
    }

    fn push_helpers(&mut self) {
        self.buf.push_str(
            "macro_rules! impl_get_le {\n\
             \x20   ($name:ident, $type:ty, $size:expr) => {\n\
             \x20       #[inline]\n\
             \x20       fn $name(buffer: &[u8], offset: usize) -> $type {\n\
             \x20           let mut bytes = [0u8; $size];\n\
             \x20           bytes.copy_from_slice(&buffer[offset..offset + $size]);\n\
             \x20           <$type>::from_le_bytes(bytes)\n\
             \x20       }\n\
             \x20   };\n\
             }\n\n\
             macro_rules! impl_put_le {\n\
             \x20   ($name:ident, $type:ty, $size:expr) => {\n\
             \x20       #[inline]\n\
             \x20       fn $name(buffer: &mut [u8], offset: usize, value: $type) {\n\
             \x20           buffer[offset..offset + $size].copy_from_slice(&value.to_le_bytes());\n\
             \x20       }\n\
             \x20   };\n\
             }\n\n\
             impl_get_le!(get_u16, u16, 2);\n\
             impl_get_le!(get_i16, i16, 2);\n\
             impl_get_le!(get_i32, i32, 4);\n\
             impl_get_le!(get_u32, u32, 4);\n\
             impl_get_le!(get_i64, i64, 8);\n\
             impl_get_le!(get_u64, u64, 8);\n\
             impl_get_le!(get_f32, f32, 4);\n\
             impl_get_le!(get_f64, f64, 8);\n\n\
             #[inline]\n\
             fn get_u8(buffer: &[u8], offset: usize) -> u8 {\n\
             \x20   buffer[offset]\n\
             }\n\n\
             impl_put_le!(put_u16, u16, 2);\n\
             impl_put_le!(put_i16, i16, 2);\n\
             impl_put_le!(put_i32, i32, 4);\n\
             impl_put_le!(put_u32, u32, 4);\n\
             impl_put_le!(put_i64, i64, 8);\n\
             impl_put_le!(put_u64, u64, 8);\n\
             impl_put_le!(put_f32, f32, 4);\n\
             impl_put_le!(put_f64, f64, 8);\n\n\
             #[inline]\n\
             fn put_u8(buffer: &mut [u8], offset: usize, value: u8) {\n\
             \x20   buffer[offset] = value;\n\
             }\n\n",
        );
    }

    fn push_message_type_consts(&mut self) {
        self.buf.push_str("/// Message type bytes.\npub mod message_type {\n");
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "    pub const {}: u8 = {};",
                message.name.to_shouty_snake_case(),
                message.id
            );
        }
        self.buf.push_str("}\n\n");
    }

    fn push_enum(&mut self, def: &EnumDef) {
        if let Some(description) = &def.description {
            let _ = writeln!(self.buf, "/// {}", description);
        }
        self.buf
            .push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n#[repr(u8)]\n");
        let _ = writeln!(self.buf, "pub enum {} {{", def.name);
        for value in &def.values {
            let _ = writeln!(
                self.buf,
                "    {} = {},",
                value.name.to_upper_camel_case(),
                value.value
            );
        }
        self.buf.push_str("}\n\n");

        let _ = writeln!(self.buf, "impl {} {{", def.name);
        self.buf.push_str(
            "    /// Decode a wire byte; `None` for unknown values.\n\
             \x20   pub fn from_byte(value: u8) -> Option<Self> {\n\
             \x20       match value {\n",
        );
        for value in &def.values {
            let _ = writeln!(
                self.buf,
                "            {} => Some(Self::{}),",
                value.value,
                value.name.to_upper_camel_case()
            );
        }
        self.buf.push_str(
            "            _ => None,\n\
             \x20       }\n\
             \x20   }\n\n\
             \x20   pub fn to_byte(self) -> u8 {\n\
             \x20       self as u8\n\
             \x20   }\n\
             }\n\n",
        );
    }

    /// Distinct field versions above 1, descending, with the fixed size each
    /// version implies.
    fn version_sizes(&self, message: &Message) -> Vec<(u8, usize)> {
        let mut versions: Vec<u8> = message
            .required
            .iter()
            .map(|f| f.version)
            .filter(|&v| v > 1)
            .collect();
        versions.sort_unstable();
        versions.dedup();
        versions.reverse();
        versions
            .into_iter()
            .map(|v| {
                let size = self.schema.header_size
                    + message
                        .required
                        .iter()
                        .filter(|f| f.version <= v)
                        .map(|f| f.ty.size().unwrap_or(0))
                        .sum::<usize>();
                (v, size)
            })
            .collect()
    }

    /// Fixed size seen by a version-1 writer.
    fn base_size(&self, message: &Message) -> usize {
        self.schema.header_size
            + message
                .required
                .iter()
                .filter(|f| f.version == 1)
                .map(|f| f.ty.size().unwrap_or(0))
                .sum::<usize>()
    }

    fn push_encoder(&mut self, message: &Message) {
        let name = &message.name;
        if let Some(description) = &message.description {
            let _ = writeln!(self.buf, "/// {}.\n///", description);
        }
        let _ = writeln!(self.buf, "/// `{}` encoder (zero-copy).", name);
        let _ = writeln!(
            self.buf,
            "pub struct {}Encoder<'a> {{\n    buffer: &'a mut [u8],\n    limit: usize,\n}}\n",
            name
        );
        let _ = writeln!(self.buf, "impl<'a> {}Encoder<'a> {{", name);
        let _ = writeln!(
            self.buf,
            "    pub const MESSAGE_TYPE: u8 = message_type::{};",
            name.to_shouty_snake_case()
        );
        let _ = writeln!(
            self.buf,
            "    pub const FIXED_SIZE: usize = {};\n",
            message.fixed_size
        );
        self.buf.push_str(
            "    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.\n\
             \x20   pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {\n\
             \x20       if buffer.len() < Self::FIXED_SIZE {\n\
             \x20           return Err(CodecError::Malformed {\n\
             \x20               offset: buffer.len(),\n\
             \x20               reason: \"buffer shorter than fixed size\",\n\
             \x20           });\n\
             \x20       }\n\
             \x20       buffer[..Self::FIXED_SIZE].fill(0);\n\
             \x20       header::set_message_type(buffer, Self::MESSAGE_TYPE)?;\n\
             \x20       header::set_schema_version(buffer, SCHEMA_VERSION)?;\n\
             \x20       header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;\n\
             \x20       Ok(Self {\n\
             \x20           buffer,\n\
             \x20           limit: Self::FIXED_SIZE,\n\
             \x20       })\n\
             \x20   }\n\n\
             \x20   /// Total encoded length: fixed region plus appended optionals.\n\
             \x20   pub fn encoded_length(&self) -> usize {\n\
             \x20       self.limit\n\
             \x20   }\n",
        );

        for field in &message.required {
            self.push_required_setter(field);
        }
        for field in &message.optional {
            self.push_optional_setter(field);
        }
        self.buf.push_str("}\n\n");
    }

    fn push_required_setter(&mut self, field: &Field) {
        let method = field.name.to_snake_case();
        match &field.ty {
            FieldType::Enum(enum_name) => {
                let _ = writeln!(
                    self.buf,
                    "\n    pub fn set_{}(&mut self, value: {}) -> &mut Self {{\n        put_u8(self.buffer, {}, value.to_byte());\n        self\n    }}",
                    method, enum_name, field.offset
                );
                let _ = writeln!(
                    self.buf,
                    "\n    /// Raw wire byte for `{}`.\n    pub fn set_{}_raw(&mut self, value: u8) -> &mut Self {{\n        put_u8(self.buffer, {}, value);\n        self\n    }}",
                    field.name, method, field.offset
                );
            }
            ty => {
                let Some((helper, rust, _)) = primitive(ty) else {
                    return;
                };
                if let Some(decimals) = field.implied_decimals {
                    let _ = writeln!(
                        self.buf,
                        "\n    /// Value scaled by 10^{} (implied decimals).",
                        decimals
                    );
                } else {
                    self.buf.push('\n');
                }
                let _ = writeln!(
                    self.buf,
                    "    pub fn set_{}(&mut self, value: {}) -> &mut Self {{\n        put_{}(self.buffer, {}, value);\n        self\n    }}",
                    method, rust, helper, field.offset
                );
            }
        }
    }

    fn push_optional_setter(&mut self, field: &Field) {
        let method = field.name.to_snake_case();
        let id = field.id.unwrap_or(0);
        match &field.ty {
            FieldType::DirectBuffer => {
                let _ = writeln!(
                    self.buf,
                    "\n    /// Append optional `{}`.\n    pub fn set_{}(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {{\n        self.limit += tlv::write_tlv(self.buffer, self.limit, {}, value)?;\n        Ok(self)\n    }}",
                    field.name, method, id
                );
            }
            FieldType::Enum(enum_name) => {
                let _ = writeln!(
                    self.buf,
                    "\n    /// Append optional `{}`.\n    pub fn set_{}(&mut self, value: {}) -> Result<&mut Self, CodecError> {{\n        self.limit += tlv::write_tlv(self.buffer, self.limit, {}, &[value.to_byte()])?;\n        Ok(self)\n    }}",
                    field.name, method, enum_name, id
                );
            }
            ty => {
                let Some((_, rust, _)) = primitive(ty) else {
                    return;
                };
                let _ = writeln!(
                    self.buf,
                    "\n    /// Append optional `{}`.\n    pub fn set_{}(&mut self, value: {}) -> Result<&mut Self, CodecError> {{\n        self.limit += tlv::write_tlv(self.buffer, self.limit, {}, &value.to_le_bytes())?;\n        Ok(self)\n    }}",
                    field.name, method, rust, id
                );
            }
        }
    }

    fn push_decoder(&mut self, message: &Message) {
        let name = &message.name;
        let _ = writeln!(
            self.buf,
            "/// `{}` decoder (zero-copy; optionals scanned lazily and cached per wrap).",
            name
        );
        let _ = writeln!(
            self.buf,
            "#[derive(Debug)]\npub struct {}Decoder<'a> {{\n    buffer: &'a [u8],\n    optionals: OptionalCache,\n}}\n",
            name
        );
        let _ = writeln!(self.buf, "impl<'a> {}Decoder<'a> {{", name);
        let _ = writeln!(
            self.buf,
            "    pub const MESSAGE_TYPE: u8 = message_type::{};",
            name.to_shouty_snake_case()
        );
        let _ = writeln!(
            self.buf,
            "    pub const FIXED_SIZE: usize = {};\n",
            message.fixed_size
        );

        let version_sizes = self.version_sizes(message);
        if version_sizes.is_empty() {
            self.buf.push_str(
                "    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {\n\
                 \x20       if buffer.len() < Self::FIXED_SIZE {\n\
                 \x20           return Err(CodecError::Malformed {\n\
                 \x20               offset: buffer.len(),\n\
                 \x20               reason: \"buffer shorter than fixed size\",\n\
                 \x20           });\n\
                 \x20       }\n\
                 \x20       Ok(Self {\n\
                 \x20           buffer,\n\
                 \x20           optionals: OptionalCache::new(),\n\
                 \x20       })\n\
                 \x20   }\n",
            );
        } else {
            // Older writers stop at earlier fixed sizes; check against the
            // wire schema version.
            self.buf.push_str("    fn fixed_size_for(version: u8) -> usize {\n");
            for (version, size) in &version_sizes {
                let _ = writeln!(
                    self.buf,
                    "        if version >= {} {{\n            return {};\n        }}",
                    version, size
                );
            }
            let _ = writeln!(self.buf, "        {}", self.base_size(message));
            self.buf.push_str("    }\n\n");
            self.buf.push_str(
                "    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {\n\
                 \x20       let version = header::schema_version(buffer)?;\n\
                 \x20       if buffer.len() < Self::fixed_size_for(version) {\n\
                 \x20           return Err(CodecError::Malformed {\n\
                 \x20               offset: buffer.len(),\n\
                 \x20               reason: \"buffer shorter than fixed size\",\n\
                 \x20           });\n\
                 \x20       }\n\
                 \x20       Ok(Self {\n\
                 \x20           buffer,\n\
                 \x20           optionals: OptionalCache::new(),\n\
                 \x20       })\n\
                 \x20   }\n",
            );
        }

        self.buf.push_str(
            "\n    /// The wrapped bytes.\n\
             \x20   pub fn buffer(&self) -> &'a [u8] {\n\
             \x20       self.buffer\n\
             \x20   }\n\n\
             \x20   pub fn application_id(&self) -> u16 {\n\
             \x20       get_u16(self.buffer, header::APPLICATION_ID_OFFSET)\n\
             \x20   }\n\n\
             \x20   pub fn application_sequence_number(&self) -> u32 {\n\
             \x20       get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)\n\
             \x20   }\n\n\
             \x20   pub fn timestamp(&self) -> u64 {\n\
             \x20       get_u64(self.buffer, header::TIMESTAMP_OFFSET)\n\
             \x20   }\n\n\
             \x20   pub fn optional_fields_index(&self) -> u16 {\n\
             \x20       get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)\n\
             \x20   }\n\n\
             \x20   pub fn schema_version(&self) -> u8 {\n\
             \x20       get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)\n\
             \x20   }\n\n\
             \x20   pub fn message_type(&self) -> u8 {\n\
             \x20       get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)\n\
             \x20   }\n",
        );

        for field in &message.required {
            self.push_required_getter(field);
        }
        for field in &message.optional {
            self.push_optional_getter(field);
        }
        self.buf.push_str("}\n\n");
    }

    fn push_required_getter(&mut self, field: &Field) {
        let method = field.name.to_snake_case();
        let versioned = field.version > 1;
        match &field.ty {
            FieldType::Enum(enum_name) => {
                if versioned {
                    let _ = writeln!(
                        self.buf,
                        "\n    /// Present when the writer's schema version is at least {}.\n    pub fn {}(&self) -> Option<{}> {{\n        if self.schema_version() >= {} {{\n            {}::from_byte(get_u8(self.buffer, {}))\n        }} else {{\n            None\n        }}\n    }}",
                        field.version, method, enum_name, field.version, enum_name, field.offset
                    );
                } else {
                    let _ = writeln!(
                        self.buf,
                        "\n    pub fn {}(&self) -> Option<{}> {{\n        {}::from_byte(get_u8(self.buffer, {}))\n    }}",
                        method, enum_name, enum_name, field.offset
                    );
                    let _ = writeln!(
                        self.buf,
                        "\n    /// Raw wire byte for `{}`.\n    pub fn {}_raw(&self) -> u8 {{\n        get_u8(self.buffer, {})\n    }}",
                        field.name, method, field.offset
                    );
                }
            }
            ty => {
                let Some((helper, rust, _)) = primitive(ty) else {
                    return;
                };
                if versioned {
                    let _ = writeln!(
                        self.buf,
                        "\n    /// Present when the writer's schema version is at least {}.\n    pub fn {}(&self) -> Option<{}> {{\n        if self.schema_version() >= {} {{\n            Some(get_{}(self.buffer, {}))\n        }} else {{\n            None\n        }}\n    }}",
                        field.version, method, rust, field.version, helper, field.offset
                    );
                } else {
                    if let Some(decimals) = field.implied_decimals {
                        let _ = writeln!(
                            self.buf,
                            "\n    /// Value scaled by 10^{} (implied decimals).",
                            decimals
                        );
                    } else {
                        self.buf.push('\n');
                    }
                    let _ = writeln!(
                        self.buf,
                        "    pub fn {}(&self) -> {} {{\n        get_{}(self.buffer, {})\n    }}",
                        method, rust, helper, field.offset
                    );
                }
            }
        }
    }

    fn push_optional_getter(&mut self, field: &Field) {
        let method = field.name.to_snake_case();
        let id = field.id.unwrap_or(0);
        let _ = writeln!(
            self.buf,
            "\n    /// True when optional `{}` was encoded.\n    pub fn has_{}(&mut self) -> Result<bool, CodecError> {{\n        let index = usize::from(self.optional_fields_index());\n        Ok(self.optionals.find(self.buffer, index, {})?.is_some())\n    }}",
            field.name, method, id
        );
        match &field.ty {
            FieldType::DirectBuffer => {
                let _ = writeln!(
                    self.buf,
                    "\n    pub fn {}(&mut self) -> Result<Option<&'a [u8]>, CodecError> {{\n        let index = usize::from(self.optional_fields_index());\n        match self.optionals.find(self.buffer, index, {})? {{\n            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),\n            None => Ok(None),\n        }}\n    }}",
                    method, id
                );
            }
            FieldType::Enum(enum_name) => {
                let _ = writeln!(
                    self.buf,
                    "\n    pub fn {}(&mut self) -> Result<Option<{}>, CodecError> {{\n        let index = usize::from(self.optional_fields_index());\n        match self.optionals.find(self.buffer, index, {})? {{\n            Some((offset, 1)) => Ok({}::from_byte(get_u8(self.buffer, offset))),\n            Some((offset, _)) => Err(CodecError::Malformed {{\n                offset,\n                reason: \"optional field size mismatch\",\n            }}),\n            None => Ok(None),\n        }}\n    }}",
                    method, enum_name, id, enum_name
                );
            }
            ty => {
                let Some((helper, rust, size)) = primitive(ty) else {
                    return;
                };
                let _ = writeln!(
                    self.buf,
                    "\n    pub fn {}(&mut self) -> Result<Option<{}>, CodecError> {{\n        let index = usize::from(self.optional_fields_index());\n        match self.optionals.find(self.buffer, index, {})? {{\n            Some((offset, {})) => Ok(Some(get_{}(self.buffer, offset))),\n            Some((offset, _)) => Err(CodecError::Malformed {{\n                offset,\n                reason: \"optional field size mismatch\",\n            }}),\n            None => Ok(None),\n        }}\n    }}",
                    method, rust, id, size, helper
                );
            }
        }
    }

    fn push_message_enums(&mut self) {
        let prefix = &self.schema.prefix;

        let _ = writeln!(
            self.buf,
            "/// Tagged view over any {} message, decoder side.\n#[derive(Debug)]\npub enum {}Message<'a> {{",
            prefix, prefix
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "    {}({}Decoder<'a>),",
                message.name, message.name
            );
        }
        self.buf.push_str("}\n\n");

        let _ = writeln!(self.buf, "impl<'a> {}Message<'a> {{", prefix);
        self.buf.push_str(
            "    /// Wrap by the header's message type; `None` for unknown types.\n\
             \x20   pub fn wrap(buffer: &'a [u8]) -> Result<Option<Self>, CodecError> {\n\
             \x20       match header::message_type(buffer)? {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            message_type::{} => Ok(Some(Self::{}({}Decoder::wrap(buffer)?))),",
                message.name.to_shouty_snake_case(),
                message.name,
                message.name
            );
        }
        self.buf.push_str(
            "            _ => Ok(None),\n\
             \x20       }\n\
             \x20   }\n\n\
             \x20   /// Wrap as `name`; unknown names are `BadMessageName`.\n\
             \x20   pub fn wrap_as(name: &str, buffer: &'a [u8]) -> Result<Self, CodecError> {\n\
             \x20       match name {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            \"{}\" => Ok(Self::{}({}Decoder::wrap(buffer)?)),",
                message.name, message.name, message.name
            );
        }
        self.buf.push_str(
            "            _ => Err(CodecError::BadMessageName {\n\
             \x20               name: name.to_string(),\n\
             \x20           }),\n\
             \x20       }\n\
             \x20   }\n\n\
             \x20   pub fn message_type(&self) -> u8 {\n\
             \x20       match self {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            Self::{}(_) => message_type::{},",
                message.name,
                message.name.to_shouty_snake_case()
            );
        }
        self.buf.push_str(
            "        }\n\
             \x20   }\n\
             }\n\n",
        );

        let _ = writeln!(
            self.buf,
            "/// Tagged view over any {} message, encoder side.\npub enum {}MessageEncoder<'a> {{",
            prefix, prefix
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "    {}({}Encoder<'a>),",
                message.name, message.name
            );
        }
        self.buf.push_str("}\n\n");

        let _ = writeln!(self.buf, "impl<'a> {}MessageEncoder<'a> {{", prefix);
        self.buf.push_str(
            "    /// Wrap `buffer` as `name`; unknown names are `BadMessageName`.\n\
             \x20   pub fn wrap_as(name: &str, buffer: &'a mut [u8]) -> Result<Self, CodecError> {\n\
             \x20       match name {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            \"{}\" => Ok(Self::{}({}Encoder::wrap(buffer)?)),",
                message.name, message.name, message.name
            );
        }
        self.buf.push_str(
            "            _ => Err(CodecError::BadMessageName {\n\
             \x20               name: name.to_string(),\n\
             \x20           }),\n\
             \x20       }\n\
             \x20   }\n\n\
             \x20   pub fn encoded_length(&self) -> usize {\n\
             \x20       match self {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            Self::{}(encoder) => encoder.encoded_length(),",
                message.name
            );
        }
        self.buf.push_str(
            "        }\n\
             \x20   }\n\
             }\n\n",
        );
    }

    fn push_facade(&mut self) {
        let prefix = &self.schema.prefix;
        let _ = writeln!(
            self.buf,
            "/// Schema facade: names, type bytes, header geometry.\npub struct {}Schema;\n",
            prefix
        );
        let _ = writeln!(self.buf, "impl {}Schema {{", prefix);
        self.buf.push_str("    pub const VERSION: u8 = SCHEMA_VERSION;\n\n");
        for field in &self.schema.header {
            let _ = writeln!(
                self.buf,
                "    pub const {}_OFFSET: usize = {};",
                field.name.to_shouty_snake_case(),
                field.offset
            );
        }

        self.buf
            .push_str("\n    pub fn message_names() -> &'static [&'static str] {\n        &[");
        for message in &self.schema.messages {
            let _ = write!(self.buf, "\"{}\", ", message.name);
        }
        self.buf.push_str("]\n    }\n\n");

        self.buf.push_str(
            "    /// Type byte for `name`; unknown names are `BadMessageName`.\n\
             \x20   pub fn message_type(name: &str) -> Result<u8, CodecError> {\n\
             \x20       match name {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            \"{}\" => Ok(message_type::{}),",
                message.name,
                message.name.to_shouty_snake_case()
            );
        }
        self.buf.push_str(
            "            _ => Err(CodecError::BadMessageName {\n\
             \x20               name: name.to_string(),\n\
             \x20           }),\n\
             \x20       }\n\
             \x20   }\n\n",
        );

        self.buf.push_str(
            "    pub fn message_name(message_type: u8) -> Option<&'static str> {\n\
             \x20       match message_type {\n",
        );
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            message_type::{} => Some(\"{}\"),",
                message.name.to_shouty_snake_case(),
                message.name
            );
        }
        self.buf.push_str(
            "            _ => None,\n\
             \x20       }\n\
             \x20   }\n\n\
             \x20   pub fn properties() -> &'static [(&'static str, &'static str)] {\n\
             \x20       PROPERTIES\n\
             \x20   }\n\n",
        );
        let _ = writeln!(
            self.buf,
            "    /// Fresh decoder for the message named `name`.\n    pub fn decoder_for<'a>(name: &str, buffer: &'a [u8]) -> Result<{}Message<'a>, CodecError> {{\n        {}Message::wrap_as(name, buffer)\n    }}\n",
            prefix, prefix
        );
        let _ = writeln!(
            self.buf,
            "    /// Fresh encoder for the message named `name`.\n    pub fn encoder_for<'a>(\n        name: &str,\n        buffer: &'a mut [u8],\n    ) -> Result<{}MessageEncoder<'a>, CodecError> {{\n        {}MessageEncoder::wrap_as(name, buffer)\n    }}\n",
            prefix, prefix
        );
        let _ = writeln!(
            self.buf,
            "    pub fn dispatcher() -> {}Dispatcher {{\n        {}Dispatcher::new()\n    }}\n",
            prefix, prefix
        );
        let _ = writeln!(
            self.buf,
            "    pub fn provider<P: MessagePublisher>(publisher: P) -> {}Provider<P> {{\n        {}Provider::new(publisher)\n    }}",
            prefix, prefix
        );
        self.buf.push_str("}\n\n");
    }

    fn push_dispatcher(&mut self) {
        let prefix = &self.schema.prefix;
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "/// `{}` listener.\npub type {}Listener = Box<dyn FnMut(&mut {}Decoder<'_>)>;",
                message.name, message.name, message.name
            );
        }
        self.buf
            .push_str("/// Raw-buffer listener run around every event.\n");
        self.buf
            .push_str("pub type GlobalListener = Box<dyn FnMut(&[u8])>;\n\n");

        let _ = writeln!(
            self.buf,
            "/// Routes events to typed listeners by message type.\n///\n/// Global before-listeners run first, then per-type listeners, then global\n/// after-listeners, each in registration order. Unknown message types are\n/// ignored.\npub struct {}Dispatcher {{",
            prefix
        );
        self.buf.push_str("    before: Vec<GlobalListener>,\n");
        self.buf.push_str("    after: Vec<GlobalListener>,\n");
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "    {}: Vec<{}Listener>,",
                message.name.to_snake_case(),
                message.name
            );
        }
        self.buf.push_str("}\n\n");

        let _ = writeln!(self.buf, "impl {}Dispatcher {{", prefix);
        self.buf.push_str("    pub fn new() -> Self {\n        Self {\n");
        self.buf.push_str("            before: Vec::new(),\n");
        self.buf.push_str("            after: Vec::new(),\n");
        for message in &self.schema.messages {
            let _ = writeln!(
                self.buf,
                "            {}: Vec::new(),",
                message.name.to_snake_case()
            );
        }
        self.buf.push_str("        }\n    }\n\n");
        self.buf.push_str(
            "    pub fn add_before_listener(&mut self, listener: GlobalListener) {\n\
             \x20       self.before.push(listener);\n\
             \x20   }\n\n\
             \x20   pub fn add_after_listener(&mut self, listener: GlobalListener) {\n\
             \x20       self.after.push(listener);\n\
             \x20   }\n",
        );
        for message in &self.schema.messages {
            let method = message.name.to_snake_case();
            let _ = writeln!(
                self.buf,
                "\n    pub fn add_{}_listener(&mut self, listener: {}Listener) {{\n        self.{}.push(listener);\n    }}",
                method, message.name, method
            );
        }

        self.buf.push_str(
            "\n    /// Dispatch one event.\n\
             \x20   pub fn dispatch(&mut self, buffer: &[u8]) {\n\
             \x20       let Ok(message_type) = header::message_type(buffer) else {\n\
             \x20           return;\n\
             \x20       };\n\
             \x20       for listener in &mut self.before {\n\
             \x20           listener(buffer);\n\
             \x20       }\n\
             \x20       match message_type {\n",
        );
        for message in &self.schema.messages {
            let method = message.name.to_snake_case();
            let _ = writeln!(
                self.buf,
                "            message_type::{} => {{\n                if let Ok(mut decoder) = {}Decoder::wrap(buffer) {{\n                    for listener in &mut self.{} {{\n                        listener(&mut decoder);\n                    }}\n                }}\n            }}",
                message.name.to_shouty_snake_case(),
                message.name,
                method
            );
        }
        self.buf.push_str(
            "            _ => {}\n\
             \x20       }\n\
             \x20       for listener in &mut self.after {\n\
             \x20           listener(buffer);\n\
             \x20       }\n\
             \x20   }\n\
             }\n\n",
        );

        let _ = writeln!(
            self.buf,
            "impl Default for {}Dispatcher {{\n    fn default() -> Self {{\n        Self::new()\n    }}\n}}\n",
            prefix
        );
        let _ = writeln!(
            self.buf,
            "impl EventHandler for {}Dispatcher {{\n    fn on_event(&mut self, buffer: &[u8]) {{\n        self.dispatch(buffer);\n    }}\n}}\n",
            prefix
        );
    }

    fn push_provider(&mut self) {
        let prefix = &self.schema.prefix;
        let _ = writeln!(
            self.buf,
            "/// Typed encoder facade over one publisher.\n///\n/// Every `*_encoder()` wraps a fresh `acquire()` buffer; commit the staged\n/// message before acquiring the next one.\npub struct {}Provider<P: MessagePublisher> {{\n    publisher: P,\n}}\n",
            prefix
        );
        let _ = writeln!(
            self.buf,
            "impl<P: MessagePublisher> {}Provider<P> {{",
            prefix
        );
        self.buf.push_str(
            "    pub fn new(publisher: P) -> Self {\n\
             \x20       Self { publisher }\n\
             \x20   }\n\n\
             \x20   pub fn publisher(&self) -> &P {\n\
             \x20       &self.publisher\n\
             \x20   }\n\n\
             \x20   pub fn publisher_mut(&mut self) -> &mut P {\n\
             \x20       &mut self.publisher\n\
             \x20   }\n\n\
             \x20   pub fn commit(&mut self, length: usize) -> Result<(), PublishError> {\n\
             \x20       self.publisher.commit(length)\n\
             \x20   }\n\n\
             \x20   pub fn send(&mut self) -> Result<(), PublishError> {\n\
             \x20       self.publisher.send()\n\
             \x20   }\n\n\
             \x20   pub fn is_current(&self) -> bool {\n\
             \x20       self.publisher.is_current()\n\
             \x20   }\n",
        );
        for message in &self.schema.messages {
            let method = message.name.to_snake_case();
            let _ = writeln!(
                self.buf,
                "\n    pub fn {}_encoder(&mut self) -> Result<{}Encoder<'_>, CodecError> {{\n        {}Encoder::wrap(self.publisher.acquire())\n    }}",
                method, message.name, message.name
            );
        }
        self.buf.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_schema;

    const SCHEMA_XML: &str = r#"<schema prefix="Toy" package="toy_msgs" version="1">
  <header>
    <field name="applicationId" type="short"/>
    <field name="applicationSequenceNumber" type="int"/>
    <field name="timestamp" type="long"/>
    <field name="optionalFieldsIndex" type="short"/>
    <field name="schemaVersion" type="byte"/>
    <field name="messageType" type="byte"/>
  </header>
  <enum name="Side">
    <value name="BUY" value="1"/>
    <value name="SELL" value="2"/>
  </enum>
  <property name="owner" value="trading"/>
  <message id="20" name="AddOrder">
    <field name="side" type="Side"/>
    <field name="quantity" type="int"/>
    <field name="price" type="long" implied-decimals="4"/>
    <optional id="1" name="note" type="DirectBuffer"/>
    <optional id="2" name="stopPrice" type="long"/>
  </message>
  <message id="21" name="Heartbeat"/>
</schema>"#;

    fn generated() -> String {
        let schema = parse_schema(SCHEMA_XML).expect("Schema should parse");
        generate(&schema)
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generated(), generated());
    }

    #[test]
    fn test_enum_generated_with_lookup() {
        let code = generated();
        assert!(code.contains("pub enum Side {"));
        assert!(code.contains("Buy = 1,"));
        assert!(code.contains("pub fn from_byte(value: u8) -> Option<Self>"));
    }

    #[test]
    fn test_message_type_constants() {
        let code = generated();
        assert!(code.contains("pub const ADD_ORDER: u8 = 20;"));
        assert!(code.contains("pub const HEARTBEAT: u8 = 21;"));
    }

    #[test]
    fn test_encoder_has_fixed_offsets() {
        let code = generated();
        // side @18, quantity @19, price @23; fixed size 31.
        assert!(code.contains("pub struct AddOrderEncoder<'a>"));
        assert!(code.contains("put_u8(self.buffer, 18, value.to_byte());"));
        assert!(code.contains("put_i32(self.buffer, 19, value);"));
        assert!(code.contains("put_i64(self.buffer, 23, value);"));
        let schema = parse_schema(SCHEMA_XML).expect("Schema should parse");
        assert_eq!(
            schema.message("AddOrder").expect("Message").fixed_size,
            31
        );
    }

    #[test]
    fn test_decoder_getters_and_optionals() {
        let code = generated();
        assert!(code.contains("pub fn side(&self) -> Option<Side>"));
        assert!(code.contains("pub fn quantity(&self) -> i32"));
        assert!(code.contains("pub fn has_note(&mut self)"));
        assert!(code.contains("pub fn note(&mut self) -> Result<Option<&'a [u8]>, CodecError>"));
        assert!(code.contains("pub fn stop_price(&mut self) -> Result<Option<i64>, CodecError>"));
    }

    #[test]
    fn test_facade_dispatcher_provider_present() {
        let code = generated();
        assert!(code.contains("pub struct ToySchema;"));
        assert!(code.contains("\"AddOrder\" => Ok(message_type::ADD_ORDER),"));
        assert!(code.contains("pub struct ToyDispatcher {"));
        assert!(code.contains("pub fn add_add_order_listener"));
        assert!(code.contains("impl EventHandler for ToyDispatcher"));
        assert!(code.contains("pub struct ToyProvider<P: MessagePublisher>"));
        assert!(code.contains("pub fn add_order_encoder"));
    }

    #[test]
    fn test_header_offsets_on_facade() {
        let code = generated();
        assert!(code.contains("pub const TIMESTAMP_OFFSET: usize = 6;"));
        assert!(code.contains("pub const MESSAGE_TYPE_OFFSET: usize = 17;"));
    }

    #[test]
    fn test_versioned_field_gating() {
        let xml = SCHEMA_XML.replace(
            r#"<field name="price" type="long" implied-decimals="4"/>"#,
            r#"<field name="price" type="long"/>
    <field name="venue" type="byte" version="2"/>"#,
        );
        let schema = parse_schema(&xml).expect("Schema should parse");
        let code = generate(&schema);
        assert!(code.contains("fn fixed_size_for(version: u8) -> usize"));
        assert!(code.contains("pub fn venue(&self) -> Option<u8>"));
        assert!(code.contains("if self.schema_version() >= 2 {"));
    }

    #[test]
    fn test_properties_emitted() {
        let code = generated();
        assert!(code.contains(r#"("owner", "trading")"#));
    }

    #[test]
    fn test_tagged_message_enums() {
        let code = generated();
        assert!(code.contains("pub enum ToyMessage<'a> {"));
        assert!(code.contains("AddOrder(AddOrderDecoder<'a>),"));
        assert!(code.contains("pub enum ToyMessageEncoder<'a> {"));
        assert!(code.contains("pub fn decoder_for<'a>(name: &str"));
        assert!(code.contains("pub fn encoder_for<'a>("));
        assert!(code.contains("Err(CodecError::BadMessageName {"));
    }
}
