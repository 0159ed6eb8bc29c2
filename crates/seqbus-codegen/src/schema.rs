// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema model and validation.
//!
//! A [`Schema`] is built once from XML at generation time, validated, and
//! then handed to the generator. Required-field byte offsets are assigned
//! here, cumulatively in declaration order, using the fixed primitive size
//! table; every non-header message inherits the header's fields at offsets
//! `0..header_size`.

use std::collections::HashSet;
use std::fmt;

/// Header field names the runtime depends on, with their required types.
const RUNTIME_HEADER_FIELDS: &[(&str, FieldType)] = &[
    ("applicationId", FieldType::Short),
    ("applicationSequenceNumber", FieldType::Int),
    ("timestamp", FieldType::Long),
    ("optionalFieldsIndex", FieldType::Short),
    ("schemaVersion", FieldType::Byte),
    ("messageType", FieldType::Byte),
];

/// Most optional fields a message may declare; keeps the decoder-side scan
/// cache inline.
pub const MAX_OPTIONAL_FIELDS: usize = 16;

/// Schema validation failure; fatal at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// XML did not parse or is structurally wrong.
    Xml {
        /// Parser message.
        reason: String,
    },
    /// A field names a type the size table does not know.
    UnknownType {
        /// Owning message (or `header`).
        message: String,
        /// Field name.
        field: String,
        /// The unknown type string.
        type_name: String,
    },
    /// Two fields of one message share a name.
    DuplicateFieldName {
        /// Owning message.
        message: String,
        /// The duplicated name.
        field: String,
    },
    /// Two messages share an id byte.
    DuplicateMessageId {
        /// The duplicated id.
        id: u8,
    },
    /// Two values of one enum share a byte.
    DuplicateEnumValue {
        /// Owning enum.
        enum_name: String,
        /// The duplicated byte.
        value: u8,
    },
    /// The header lacks a field the runtime requires.
    MissingHeaderField {
        /// Expected field name.
        field: String,
    },
    /// A required field has a variable-length type.
    RequiredVariableLength {
        /// Owning message.
        message: String,
        /// Field name.
        field: String,
    },
    /// An optional field has no id.
    MissingOptionalId {
        /// Owning message.
        message: String,
        /// Field name.
        field: String,
    },
    /// Two optional fields of one message share an id.
    DuplicateOptionalId {
        /// Owning message.
        message: String,
        /// The duplicated id.
        id: u8,
    },
    /// A message declares more optionals than the decoder cache holds.
    TooManyOptionals {
        /// Owning message.
        message: String,
    },
    /// A field version below 1.
    BadFieldVersion {
        /// Owning message.
        message: String,
        /// Field name.
        field: String,
    },
    /// A foreign key naming an entity no message declares.
    UnknownForeignKey {
        /// Owning message.
        message: String,
        /// Field name.
        field: String,
        /// The unresolved entity name.
        entity: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml { reason } => write!(f, "invalid schema XML: {}", reason),
            Self::UnknownType {
                message,
                field,
                type_name,
            } => write!(f, "{}.{}: unknown type '{}'", message, field, type_name),
            Self::DuplicateFieldName { message, field } => {
                write!(f, "{}: duplicate field name '{}'", message, field)
            }
            Self::DuplicateMessageId { id } => write!(f, "duplicate message id {}", id),
            Self::DuplicateEnumValue { enum_name, value } => {
                write!(f, "enum {}: duplicate value {}", enum_name, value)
            }
            Self::MissingHeaderField { field } => {
                write!(f, "header is missing required field '{}'", field)
            }
            Self::RequiredVariableLength { message, field } => {
                write!(f, "{}.{}: required fields must be fixed size", message, field)
            }
            Self::MissingOptionalId { message, field } => {
                write!(f, "{}.{}: optional field without id", message, field)
            }
            Self::DuplicateOptionalId { message, id } => {
                write!(f, "{}: duplicate optional id {}", message, id)
            }
            Self::TooManyOptionals { message } => write!(
                f,
                "{}: more than {} optional fields",
                message, MAX_OPTIONAL_FIELDS
            ),
            Self::BadFieldVersion { message, field } => {
                write!(f, "{}.{}: field version must be >= 1", message, field)
            }
            Self::UnknownForeignKey {
                message,
                field,
                entity,
            } => write!(
                f,
                "{}.{}: foreign key references unknown entity '{}'",
                message, field, entity
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Wire type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Long,
    Double,
    /// Variable-length bytes; optional fields only.
    DirectBuffer,
    /// One-byte reference to a schema enum.
    Enum(String),
}

impl FieldType {
    /// Parse a schema type string; enum names resolve against `enums`.
    pub fn parse(s: &str, enums: &[EnumDef]) -> Option<FieldType> {
        match s {
            "byte" => Some(Self::Byte),
            "char" => Some(Self::Char),
            "short" => Some(Self::Short),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "long" => Some(Self::Long),
            "double" => Some(Self::Double),
            "DirectBuffer" => Some(Self::DirectBuffer),
            other => enums
                .iter()
                .any(|e| e.name == other)
                .then(|| Self::Enum(other.to_string())),
        }
    }

    /// Fixed wire size in bytes; `None` for variable-length types.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Byte | Self::Enum(_) => Some(1),
            Self::Char | Self::Short => Some(2),
            Self::Int | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::DirectBuffer => None,
        }
    }

    /// The Rust type generated accessors use.
    pub fn rust_type(&self) -> &str {
        match self {
            Self::Byte => "u8",
            Self::Char => "u16",
            Self::Short => "i16",
            Self::Int => "i32",
            Self::Float => "f32",
            Self::Long => "i64",
            Self::Double => "f64",
            Self::DirectBuffer => "&[u8]",
            Self::Enum(name) => name,
        }
    }
}

/// One field of a message (or of the header).
#[derive(Debug, Clone)]
pub struct Field {
    /// TLV id; optional fields only.
    pub id: Option<u8>,
    pub name: String,
    pub ty: FieldType,
    /// Schema version that introduced this field.
    pub version: u8,
    pub metadata: Option<String>,
    pub implied_decimals: Option<u8>,
    pub primary_key: bool,
    pub key: bool,
    /// Entity name this field references.
    pub foreign_key: Option<String>,
    pub description: Option<String>,
    /// Byte offset from message start; assigned during validation for
    /// required fields, 0 for optionals.
    pub offset: usize,
}

impl Field {
    pub fn new(name: &str, ty: FieldType) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            ty,
            version: 1,
            metadata: None,
            implied_decimals: None,
            primary_key: false,
            key: false,
            foreign_key: None,
            description: None,
            offset: 0,
        }
    }
}

/// One enum value.
#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub value: u8,
    pub description: Option<String>,
}

/// A schema enum: ordered values, unique bytes.
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

/// A message definition.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u8,
    pub name: String,
    pub entity: Option<String>,
    pub base_entity: Option<String>,
    pub description: Option<String>,
    /// Message-specific required fields (header excluded).
    pub required: Vec<Field>,
    pub optional: Vec<Field>,
    /// Header size + sum of required sizes, for the compiled version.
    pub fixed_size: usize,
}

/// The validated schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub prefix: String,
    pub package: String,
    pub version: u32,
    pub description: Option<String>,
    pub header: Vec<Field>,
    pub messages: Vec<Message>,
    pub enums: Vec<EnumDef>,
    pub properties: Vec<(String, String)>,
    pub header_size: usize,
}

impl Schema {
    /// Validate the model and assign required-field offsets.
    pub fn validate(&mut self) -> Result<(), SchemaError> {
        self.validate_enums()?;
        self.header_size = Self::assign_offsets("header", &mut self.header, 0)?;
        self.validate_header()?;
        self.validate_foreign_keys()?;

        let mut message_ids = HashSet::new();
        for message in &mut self.messages {
            if !message_ids.insert(message.id) {
                return Err(SchemaError::DuplicateMessageId { id: message.id });
            }

            let mut names: HashSet<&str> = self.header.iter().map(|f| f.name.as_str()).collect();
            for field in message.required.iter().chain(&message.optional) {
                if !names.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateFieldName {
                        message: message.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if field.version < 1 {
                    return Err(SchemaError::BadFieldVersion {
                        message: message.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if field.primary_key && !field.key {
                    // Primary-key fields are key fields by definition.
                    return Err(SchemaError::Xml {
                        reason: format!(
                            "{}.{}: primary-key field must also be a key field",
                            message.name, field.name
                        ),
                    });
                }
            }

            message.fixed_size =
                Self::assign_offsets(&message.name, &mut message.required, self.header_size)?;

            if message.optional.len() > MAX_OPTIONAL_FIELDS {
                return Err(SchemaError::TooManyOptionals {
                    message: message.name.clone(),
                });
            }
            let mut optional_ids = HashSet::new();
            for field in &message.optional {
                let id = field.id.ok_or_else(|| SchemaError::MissingOptionalId {
                    message: message.name.clone(),
                    field: field.name.clone(),
                })?;
                if !optional_ids.insert(id) {
                    return Err(SchemaError::DuplicateOptionalId {
                        message: message.name.clone(),
                        id,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_enums(&self) -> Result<(), SchemaError> {
        for def in &self.enums {
            let mut values = HashSet::new();
            for value in &def.values {
                if !values.insert(value.value) {
                    return Err(SchemaError::DuplicateEnumValue {
                        enum_name: def.name.clone(),
                        value: value.value,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self) -> Result<(), SchemaError> {
        let entities: HashSet<&str> = self
            .messages
            .iter()
            .filter_map(|m| m.entity.as_deref())
            .collect();
        for message in &self.messages {
            for field in message.required.iter().chain(&message.optional) {
                if let Some(entity) = &field.foreign_key {
                    if !entities.contains(entity.as_str()) {
                        return Err(SchemaError::UnknownForeignKey {
                            message: message.name.clone(),
                            field: field.name.clone(),
                            entity: entity.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_header(&self) -> Result<(), SchemaError> {
        for (name, expected_ty) in RUNTIME_HEADER_FIELDS {
            let found = self
                .header
                .iter()
                .find(|f| f.name == *name)
                .ok_or_else(|| SchemaError::MissingHeaderField {
                    field: (*name).to_string(),
                })?;
            if found.ty != *expected_ty {
                return Err(SchemaError::Xml {
                    reason: format!("header field '{}' has the wrong type", name),
                });
            }
        }
        Ok(())
    }

    /// Assign cumulative offsets starting at `base`; returns the end offset.
    fn assign_offsets(
        owner: &str,
        fields: &mut [Field],
        base: usize,
    ) -> Result<usize, SchemaError> {
        let mut offset = base;
        for field in fields {
            let size = match field.ty.size() {
                Some(size) => size,
                None => {
                    return Err(SchemaError::RequiredVariableLength {
                        message: owner.to_string(),
                        field: field.name.clone(),
                    })
                }
            };
            field.offset = offset;
            offset += size;
        }
        Ok(offset)
    }

    /// Standard platform header matching the runtime's fixed layout.
    pub fn standard_header() -> Vec<Field> {
        RUNTIME_HEADER_FIELDS
            .iter()
            .map(|(name, ty)| Field::new(name, ty.clone()))
            .collect()
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }
}
