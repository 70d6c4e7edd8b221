// src/loader/tmx_loader.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;
use macroquad::prelude::*;
use roxmltree::Document;
use roxmltree::Node as XmlNode;

use crate::error::MapError;
use crate::map::*;

/// Attribute lookup with a typed default. A missing attribute or one whose
/// text fails to parse yields the default, never an error. Structural
/// integrity is enforced elsewhere; individual values degrade gracefully.
fn attr_or<T: std::str::FromStr>(node: XmlNode<'_, '_>, name: &str, default: T) -> T {
    node.attribute(name)
        .and_then(|text| text.parse().ok())
        .unwrap_or(default)
}

fn attr_str(node: XmlNode<'_, '_>, name: &str, default: &str) -> String {
    node.attribute(name).unwrap_or(default).to_string()
}

/// TMX booleans are written as `0`/`1`, occasionally `true`/`false`.
fn attr_flag_or(node: XmlNode<'_, '_>, name: &str, default: bool) -> bool {
    match node.attribute(name) {
        None => default,
        Some("0") | Some("false") => false,
        Some("1") | Some("true") => true,
        Some(_) => default,
    }
}

fn child_element<'a, 'input>(
    node: XmlNode<'a, 'input>,
    name: &str,
) -> Option<XmlNode<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Same defaulting rule as [attr_or], applied to an attribute of a named
/// child element (e.g. `<image source=...>` under a tileset).
fn child_attr_or<T: std::str::FromStr>(
    node: XmlNode<'_, '_>,
    child: &str,
    name: &str,
    default: T,
) -> T {
    match child_element(node, child) {
        Some(c) => attr_or(c, name, default),
        None => default,
    }
}

/// Parse `#AARRGGBB`, `#RRGGBB` or the same without the leading `#`.
fn parse_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        8 => {
            let [a, r, g, b] = value.to_be_bytes();
            Some(Color::from_rgba(r, g, b, a))
        }
        6 => {
            let [_, r, g, b] = value.to_be_bytes();
            Some(Color::from_rgba(r, g, b, 255))
        }
        _ => None,
    }
}

/// Parse a TMX map from an in-memory document.
///
/// This covers maps embedded with `include_str!` as well. The function is
/// pure: repeated and concurrent loads are safe, and a failed parse returns
/// no partial map.
pub fn decode_tmx_str(xml: &str) -> Result<TileMap, MapError> {
    let document = Document::parse(xml)?;
    parse_map(document.root_element())
}

/// Parse a TMX map from a file.
///
/// Returns the map together with the file's directory, which image paths
/// inside the document are relative to.
pub fn decode_tmx_file(path: impl AsRef<Path>) -> Result<(TileMap, PathBuf), MapError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = Document::parse(&text).map_err(|source| MapError::Xml {
        path: Some(path.to_path_buf()),
        source,
    })?;
    let map = parse_map(document.root_element())?;

    let base_dir = path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    Ok((map, base_dir))
}

fn parse_map(root: XmlNode<'_, '_>) -> Result<TileMap, MapError> {
    if root.tag_name().name() != "map" {
        return Err(MapError::NotATmxMap(root.tag_name().name().to_string()));
    }

    let mut map = TileMap {
        orientation: attr_or(root, "orientation", Orientation::Orthogonal),
        render_order: attr_str(root, "renderorder", "left-up"),
        width: attr_or(root, "width", 0),
        height: attr_or(root, "height", 0),
        tile_width: attr_or(root, "tilewidth", 0),
        tile_height: attr_or(root, "tileheight", 0),
        infinite: attr_flag_or(root, "infinite", false),
        properties: parse_properties(root),
        ..TileMap::default()
    };

    // Document order is draw and lookup order, so each node is appended as
    // it is encountered.
    for child in root.children().filter(|c| c.is_element()) {
        match child.tag_name().name() {
            "tileset" => map.add_tileset(parse_tileset(child)),
            "group" => map.add_node(Node::Group(parse_group(child, "")?)),
            "layer" => map.add_node(Node::Layer(parse_layer(child, "")?)),
            "objectgroup" => map.add_node(Node::Objects(parse_object_group(child, ""))),
            "imagelayer" => map.add_node(Node::Image(parse_image_layer(child, ""))),
            _ => {}
        }
    }

    Ok(map)
}

fn parse_tileset(node: XmlNode<'_, '_>) -> Tileset {
    let image = child_element(node, "image");
    let mut tileset = Tileset {
        first_gid: attr_or(node, "firstgid", 0),
        name: attr_str(node, "name", ""),
        tile_width: attr_or(node, "tilewidth", 0),
        tile_height: attr_or(node, "tileheight", 0),
        spacing: attr_or(node, "spacing", 0),
        margin: attr_or(node, "margin", 0),
        tile_count: attr_or(node, "tilecount", 0),
        columns: attr_or(node, "columns", 0),
        visible: attr_flag_or(node, "visible", true),
        tile_offset: vec2(
            child_attr_or(node, "tileoffset", "x", 0.0),
            child_attr_or(node, "tileoffset", "y", 0.0),
        ),
        transformations: parse_transformations(node),
        image_source: image
            .and_then(|img| img.attribute("source"))
            .unwrap_or("")
            .to_string(),
        transparent: image
            .and_then(|img| img.attribute("trans"))
            .and_then(parse_color),
        texture: None,
        quads: HashMap::new(),
    };
    tileset.build_quads();
    tileset
}

fn parse_transformations(node: XmlNode<'_, '_>) -> Transformations {
    match child_element(node, "transformations") {
        None => Transformations::default(),
        Some(t) => Transformations {
            hflip: attr_flag_or(t, "hflip", false),
            vflip: attr_flag_or(t, "vflip", false),
            rotate: attr_flag_or(t, "rotate", false),
            prefer_untransformed: attr_flag_or(t, "preferuntransformed", false),
        },
    }
}

fn parse_layer(node: XmlNode<'_, '_>, parent: &str) -> Result<TileLayer, MapError> {
    let name = attr_str(node, "name", "");
    let width: u32 = attr_or(node, "width", 0);
    let height: u32 = attr_or(node, "height", 0);

    let text = child_element(node, "data")
        .and_then(|data| data.text())
        .unwrap_or("");
    let tokens: Vec<&str> = text
        .split(|c| c == ',' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let expected = (width * height) as usize;
    if tokens.len() != expected {
        return Err(MapError::InvalidLayerSize {
            layer: name,
            expected,
            actual: tokens.len(),
        });
    }

    Ok(TileLayer {
        class: attr_str(node, "class", ""),
        width,
        height,
        opacity: attr_or(node, "opacity", 1.0),
        visible: attr_flag_or(node, "visible", true),
        data: tokens
            .iter()
            .map(|t| t.parse::<u32>().unwrap_or(0))
            .collect(),
        properties: parse_properties(node),
        parent: parent.to_string(),
        name,
    })
}

fn parse_group(node: XmlNode<'_, '_>, parent: &str) -> Result<Group, MapError> {
    let name = attr_str(node, "name", "");
    let mut group = Group {
        name: name.clone(),
        opacity: attr_or(node, "opacity", 1.0),
        visible: attr_flag_or(node, "visible", true),
        properties: parse_properties(node),
        parent: parent.to_string(),
        contents: Vec::new(),
    };

    for child in node.children().filter(|c| c.is_element()) {
        match child.tag_name().name() {
            "group" => group.add_node(Node::Group(parse_group(child, &name)?)),
            "layer" => group.add_node(Node::Layer(parse_layer(child, &name)?)),
            "objectgroup" => group.add_node(Node::Objects(parse_object_group(child, &name))),
            "imagelayer" => group.add_node(Node::Image(parse_image_layer(child, &name))),
            _ => {}
        }
    }

    Ok(group)
}

fn parse_object_group(node: XmlNode<'_, '_>, parent: &str) -> ObjectGroup {
    let name = attr_str(node, "name", "");
    let mut group = ObjectGroup {
        name: name.clone(),
        opacity: attr_or(node, "opacity", 1.0),
        visible: attr_flag_or(node, "visible", true),
        objects: Vec::new(),
        properties: parse_properties(node),
        parent: parent.to_string(),
    };

    for child in node.children() {
        if child.is_element() && child.tag_name().name() == "object" {
            group.add_object(parse_object(child, &name));
        }
    }

    group
}

fn parse_object(node: XmlNode<'_, '_>, parent: &str) -> Object {
    Object {
        id: attr_or(node, "id", 0),
        name: attr_str(node, "name", ""),
        class: node
            .attribute("type")
            .or_else(|| node.attribute("class"))
            .unwrap_or("")
            .to_string(),
        gid: attr_or(node, "gid", 0),
        bounds: Rect::new(
            attr_or(node, "x", 0.0),
            attr_or(node, "y", 0.0),
            attr_or(node, "width", 0.0),
            attr_or(node, "height", 0.0),
        ),
        rotation: attr_or(node, "rotation", 0.0),
        visible: attr_flag_or(node, "visible", true),
        shape: parse_shape_kind(node),
        properties: parse_properties(node),
        parent: parent.to_string(),
    }
}

/// The first child element decides the shape; anything unrecognized (or no
/// child at all) leaves the object a plain rectangle.
fn parse_shape_kind(node: XmlNode<'_, '_>) -> ShapeKind {
    let Some(first) = node.children().find(|c| c.is_element()) else {
        return ShapeKind::Default;
    };
    match first.tag_name().name().to_ascii_lowercase().as_str() {
        "ellipse" => ShapeKind::Ellipse,
        "point" => ShapeKind::Point,
        "polygon" => ShapeKind::Polygon,
        "text" => ShapeKind::Text,
        _ => ShapeKind::Default,
    }
}

fn parse_image_layer(node: XmlNode<'_, '_>, parent: &str) -> ImageLayer {
    let image = child_element(node, "image");
    ImageLayer {
        name: attr_str(node, "name", ""),
        class: attr_str(node, "class", ""),
        opacity: attr_or(node, "opacity", 1.0),
        visible: attr_flag_or(node, "visible", true),
        offset: vec2(attr_or(node, "offsetx", 0.0), attr_or(node, "offsety", 0.0)),
        repeat_x: attr_flag_or(node, "repeatx", false),
        repeat_y: attr_flag_or(node, "repeaty", false),
        image_source: image
            .and_then(|img| img.attribute("source"))
            .unwrap_or("")
            .to_string(),
        transparent: image
            .and_then(|img| img.attribute("trans"))
            .and_then(parse_color),
        texture: None,
        properties: parse_properties(node),
        parent: parent.to_string(),
    }
}

fn parse_properties(node: XmlNode<'_, '_>) -> Properties {
    let mut properties = Properties::new();
    let Some(container) = child_element(node, "properties") else {
        return properties;
    };

    for prop in container
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "property")
    {
        let name = attr_str(prop, "name", "");
        let kind = prop.attribute("type").unwrap_or("string");
        let text = prop.attribute("value").unwrap_or("");

        let value = match kind.to_ascii_lowercase().as_str() {
            "bool" => PropertyValue::Bool(text.parse().unwrap_or(false)),
            "color" => {
                PropertyValue::Color(parse_color(text).unwrap_or(Color::new(0.0, 0.0, 0.0, 0.0)))
            }
            "file" => PropertyValue::File(text.to_string()),
            "float" => PropertyValue::Float(text.parse().unwrap_or(0.0)),
            "int" => PropertyValue::Int(text.parse().unwrap_or(0)),
            "object" => PropertyValue::Object(text.parse().unwrap_or(0)),
            "string" => PropertyValue::String(text.to_string()),
            other => {
                warn!("dropping property '{}' with unrecognized type '{}'", name, other);
                continue;
            }
        };

        properties.push(Property {
            id: attr_or(prop, "id", 0),
            name,
            value,
        });
    }

    properties
}
