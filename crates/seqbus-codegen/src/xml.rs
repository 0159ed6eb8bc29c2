// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema XML parsing.
//!
//! ```xml
//! <schema prefix="Match" package="match_msgs" version="1" description="...">
//!   <header>
//!     <field name="applicationId" type="short"/>
//!     ...
//!   </header>
//!   <enum name="Side">
//!     <value name="BUY" value="1"/>
//!   </enum>
//!   <property name="owner" value="trading"/>
//!   <message id="20" name="AddOrder" entity="order">
//!     <field name="quantity" type="int"/>
//!     <optional id="1" name="note" type="DirectBuffer"/>
//!   </message>
//! </schema>
//! ```

use roxmltree::{Document, Node};

use crate::schema::{EnumDef, EnumValue, Field, FieldType, Message, Schema, SchemaError};

/// Parse and validate a schema document.
pub fn parse_schema(xml: &str) -> Result<Schema, SchemaError> {
    let doc = Document::parse(xml).map_err(|e| SchemaError::Xml {
        reason: e.to_string(),
    })?;
    let root = doc.root_element();
    if root.tag_name().name() != "schema" {
        return Err(SchemaError::Xml {
            reason: "root element must be <schema>".to_string(),
        });
    }

    let prefix = require_attr(root, "prefix")?;
    let package = require_attr(root, "package")?;
    let version: u32 = require_attr(root, "version")?
        .parse()
        .map_err(|_| SchemaError::Xml {
            reason: "schema version must be a non-negative integer".to_string(),
        })?;
    let description = root.attribute("description").map(str::to_string);

    // Enums first so message field types can resolve against them.
    let mut enums = Vec::new();
    for node in elements(root, "enum") {
        enums.push(parse_enum(node)?);
    }

    let header = match elements(root, "header").next() {
        Some(node) => {
            let mut fields = Vec::new();
            for field in elements(node, "field") {
                fields.push(parse_field(field, "header", &enums)?);
            }
            fields
        }
        None => {
            return Err(SchemaError::Xml {
                reason: "schema has no <header>".to_string(),
            })
        }
    };

    let mut properties = Vec::new();
    for node in elements(root, "property") {
        properties.push((require_attr(node, "name")?, require_attr(node, "value")?));
    }

    let mut messages = Vec::new();
    for node in elements(root, "message") {
        messages.push(parse_message(node, &enums)?);
    }

    let mut schema = Schema {
        prefix,
        package,
        version,
        description,
        header,
        messages,
        enums,
        properties,
        header_size: 0,
    };
    schema.validate()?;
    Ok(schema)
}

fn elements<'a, 'input>(
    parent: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent
        .children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn require_attr(node: Node<'_, '_>, name: &str) -> Result<String, SchemaError> {
    node.attribute(name)
        .map(str::to_string)
        .ok_or_else(|| SchemaError::Xml {
            reason: format!(
                "<{}> is missing attribute '{}'",
                node.tag_name().name(),
                name
            ),
        })
}

fn parse_byte_attr(node: Node<'_, '_>, name: &str) -> Result<Option<u8>, SchemaError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| SchemaError::Xml {
            reason: format!("attribute '{}' must be a byte, got '{}'", name, raw),
        }),
    }
}

fn parse_bool_attr(node: Node<'_, '_>, name: &str) -> bool {
    node.attribute(name).is_some_and(|v| v == "true")
}

fn parse_enum(node: Node<'_, '_>) -> Result<EnumDef, SchemaError> {
    let name = require_attr(node, "name")?;
    let mut values = Vec::new();
    for value in elements(node, "value") {
        values.push(EnumValue {
            name: require_attr(value, "name")?,
            value: parse_byte_attr(value, "value")?.ok_or_else(|| SchemaError::Xml {
                reason: format!("enum {}: <value> is missing 'value'", name),
            })?,
            description: value.attribute("description").map(str::to_string),
        });
    }
    Ok(EnumDef {
        name,
        description: node.attribute("description").map(str::to_string),
        values,
    })
}

fn parse_field(
    node: Node<'_, '_>,
    owner: &str,
    enums: &[EnumDef],
) -> Result<Field, SchemaError> {
    let name = require_attr(node, "name")?;
    let type_name = require_attr(node, "type")?;
    let ty = FieldType::parse(&type_name, enums).ok_or_else(|| SchemaError::UnknownType {
        message: owner.to_string(),
        field: name.clone(),
        type_name,
    })?;

    let mut field = Field::new(&name, ty);
    field.id = parse_byte_attr(node, "id")?;
    field.version = parse_byte_attr(node, "version")?.unwrap_or(1);
    field.metadata = node.attribute("metadata").map(str::to_string);
    field.implied_decimals = parse_byte_attr(node, "implied-decimals")?;
    field.primary_key = parse_bool_attr(node, "primary-key");
    // Primary-key fields are key fields by convention.
    field.key = parse_bool_attr(node, "key") || field.primary_key;
    field.foreign_key = node.attribute("foreign-key").map(str::to_string);
    field.description = node.attribute("description").map(str::to_string);
    Ok(field)
}

fn parse_message(node: Node<'_, '_>, enums: &[EnumDef]) -> Result<Message, SchemaError> {
    let name = require_attr(node, "name")?;
    let id = parse_byte_attr(node, "id")?.ok_or_else(|| SchemaError::Xml {
        reason: format!("message {} is missing 'id'", name),
    })?;

    let mut required = Vec::new();
    for field in elements(node, "field") {
        required.push(parse_field(field, &name, enums)?);
    }
    let mut optional = Vec::new();
    for field in elements(node, "optional") {
        optional.push(parse_field(field, &name, enums)?);
    }

    Ok(Message {
        id,
        name: name.clone(),
        entity: node.attribute("entity").map(str::to_string),
        base_entity: node.attribute("base-entity").map(str::to_string),
        description: node.attribute("description").map(str::to_string),
        required,
        optional,
        fixed_size: 0,
    })
}
