// tests/render_tests.rs

use macroquad::prelude::*;
use macroquad_tmx::{decode_tmx_str, RenderTarget, TileMap, Tileset};
use std::f32::consts::FRAC_PI_2;

struct DrawCall {
    layer: String,
    first_gid: u32,
    source: Rect,
    dest: Rect,
    tint: Color,
    rotation: f32,
    origin: Vec2,
    flip_y: bool,
}

#[derive(Default)]
struct RecordingTarget {
    calls: Vec<DrawCall>,
}

impl RenderTarget for RecordingTarget {
    fn draw_region(
        &mut self,
        tileset: &Tileset,
        source: Rect,
        dest: Rect,
        tint: Color,
        rotation: f32,
        origin: Vec2,
        flip_y: bool,
        layer: &str,
    ) {
        self.calls.push(DrawCall {
            layer: layer.to_string(),
            first_gid: tileset.first_gid,
            source,
            dest,
            tint,
            rotation,
            origin,
            flip_y,
        });
    }
}

fn record(map: &TileMap) -> Vec<DrawCall> {
    let mut target = RecordingTarget::default();
    map.draw(&mut target);
    target.calls
}

const FIXTURE: &str = r#"
<map width="2" height="2" tilewidth="16" tileheight="16">
  <tileset firstgid="1" name="t" tilewidth="16" tileheight="16" tilecount="4" columns="2">
    <image source="tiles.png"/>
  </tileset>
  <layer name="below" width="2" height="2" opacity="0.5">
    <data>1,0,0,4</data>
  </layer>
  <group name="hiddenworld" visible="0">
    <layer name="secret" width="2" height="2"><data>1,1,1,1</data></layer>
  </group>
  <group name="world">
    <layer name="inner" width="2" height="2"><data>0,2,0,0</data></layer>
  </group>
  <objectgroup name="props" opacity="0.25">
    <object id="1" name="crate" gid="3" x="16" y="32" width="16" height="16"/>
    <object id="2" name="zone" x="0" y="0" width="8" height="8"/>
    <object id="3" name="ghost" gid="3" x="0" y="0" width="16" height="16" visible="0"/>
  </objectgroup>
  <layer name="junk" width="2" height="2"><data>99,0,0,0</data></layer>
  <imagelayer name="backdrop"><image source="sky.png"/></imagelayer>
</map>
"#;

#[test]
fn draws_in_declaration_order() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);
    let order: Vec<&str> = calls.iter().map(|c| c.layer.as_str()).collect();
    assert_eq!(order, vec!["below", "below", "inner", "props"]);
}

#[test]
fn hidden_group_hides_visible_descendants() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);
    // "secret" is visible itself, but sits inside a hidden group
    assert!(calls.iter().all(|c| c.layer != "secret"));
}

#[test]
fn empty_and_unresolvable_cells_are_skipped() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);
    // "junk" only holds id 99, which no tileset claims
    assert!(calls.iter().all(|c| c.layer != "junk"));
    // 2 cells of "below", 1 of "inner", 1 object of "props"
    assert_eq!(calls.len(), 4);
}

#[test]
fn invisible_objects_are_skipped() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);
    let props: Vec<_> = calls.iter().filter(|c| c.layer == "props").collect();
    assert_eq!(props.len(), 1);
}

#[test]
fn cells_map_to_grid_destinations_and_quads() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);

    // "below" cell (0,0) holds id 1, cell (1,1) holds id 4
    assert_eq!(calls[0].dest, Rect::new(0.0, 0.0, 16.0, 16.0));
    assert_eq!(calls[0].source, Rect::new(0.0, 0.0, 16.0, 16.0));
    assert_eq!(calls[1].dest, Rect::new(16.0, 16.0, 16.0, 16.0));
    assert_eq!(calls[1].source, Rect::new(16.0, 16.0, 16.0, 16.0));
    assert_eq!(calls[0].first_gid, 1);
}

#[test]
fn scale_and_offset_move_destinations() {
    let mut map = decode_tmx_str(FIXTURE).expect("decode");
    map.scale = 2.0;
    map.offset = vec2(10.0, 20.0);
    let calls = record(&map);

    assert_eq!(calls[0].dest, Rect::new(10.0, 20.0, 32.0, 32.0));
    assert_eq!(calls[1].dest, Rect::new(42.0, 52.0, 32.0, 32.0));
}

#[test]
fn layers_are_tinted_by_their_own_opacity() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);
    assert_eq!(calls[0].tint, Color::new(0.5, 0.5, 0.5, 0.5));
    // object groups tint by their own opacity
    let prop = calls.iter().find(|c| c.layer == "props").unwrap();
    assert_eq!(prop.tint, Color::new(0.25, 0.25, 0.25, 0.25));
}

#[test]
fn gid_objects_anchor_at_the_bottom_of_their_bounds() {
    let map = decode_tmx_str(FIXTURE).expect("decode");
    let calls = record(&map);
    let prop = calls.iter().find(|c| c.layer == "props").unwrap();
    assert_eq!(prop.dest, Rect::new(16.0, 32.0, 16.0, 16.0));
    assert_eq!(prop.origin, vec2(0.0, 16.0));
    assert!(!prop.flip_y);
}

#[test]
fn flip_flags_drive_rotation_and_flip_effects() {
    // cell 0: H|V flipped id 1, cell 1: diagonally flipped id 1
    let xml = r#"
    <map width="2" height="1" tilewidth="16" tileheight="16">
      <tileset firstgid="1" name="t" tilewidth="16" tileheight="16" tilecount="4" columns="2">
        <image source="tiles.png"/>
      </tileset>
      <layer name="l" width="2" height="1">
        <data>3221225473,536870913</data>
      </layer>
    </map>
    "#;
    let map = decode_tmx_str(xml).expect("decode");
    let calls = record(&map);
    assert_eq!(calls.len(), 2);

    // both scale axes negative: vertical-flip effect, no rotation
    assert_eq!(calls[0].rotation, 0.0);
    assert!(calls[0].flip_y);
    assert_eq!(calls[0].origin, vec2(0.0, 0.0));

    // diagonal flip: quarter turn, no flip effect
    assert_eq!(calls[1].rotation, FRAC_PI_2);
    assert!(!calls[1].flip_y);
    assert_eq!(calls[1].origin, vec2(0.0, 16.0));
}

#[test]
fn object_rotation_adds_to_the_decoded_rotation() {
    let xml = r#"
    <map width="1" height="1" tilewidth="16" tileheight="16">
      <tileset firstgid="1" name="t" tilewidth="16" tileheight="16" tilecount="4" columns="2">
        <image source="tiles.png"/>
      </tileset>
      <objectgroup name="o">
        <object id="1" gid="1" x="0" y="16" width="16" height="16" rotation="90"/>
      </objectgroup>
    </map>
    "#;
    let map = decode_tmx_str(xml).expect("decode");
    let calls = record(&map);
    assert_eq!(calls.len(), 1);
    assert!((calls[0].rotation - FRAC_PI_2).abs() < 1e-6);
    // nonzero rotation selects the rotated origin, not the bottom anchor
    assert_eq!(calls[0].origin, vec2(0.0, 16.0));
}

#[test]
fn image_layers_are_a_no_op() {
    let xml = r#"
    <map width="1" height="1" tilewidth="16" tileheight="16">
      <imagelayer name="backdrop"><image source="sky.png"/></imagelayer>
      <layer name="l" width="1" height="1"><data>0</data></layer>
    </map>
    "#;
    let map = decode_tmx_str(xml).expect("decode");
    assert!(record(&map).is_empty());
}
