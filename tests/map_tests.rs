// tests/map_tests.rs

use macroquad_tmx::{decode_tmx_str, MapError, Node, TileMap};

const SCENARIO: &str = r#"
<map orientation="orthogonal" width="2" height="2" tilewidth="16" tileheight="16">
  <tileset firstgid="1" name="terrain" tilewidth="16" tileheight="16"
           spacing="0" margin="0" tilecount="4" columns="2">
    <image source="tiles.png"/>
  </tileset>
  <layer name="ground" width="2" height="2">
    <data>1,2,3,4</data>
  </layer>
  <group name="world">
    <objectgroup name="spawns">
      <object id="1" name="start" type="spawn" x="8" y="8" width="16" height="16"/>
    </objectgroup>
  </group>
</map>
"#;

#[test]
fn scenario_produces_expected_quads() {
    use macroquad::prelude::Rect;

    let map = decode_tmx_str(SCENARIO).expect("decode");
    let ts = &map.tilesets[0];
    assert_eq!(ts.quads[&1], Rect::new(0.0, 0.0, 16.0, 16.0));
    assert_eq!(ts.quads[&2], Rect::new(16.0, 0.0, 16.0, 16.0));
    assert_eq!(ts.quads[&3], Rect::new(0.0, 16.0, 16.0, 16.0));
    assert_eq!(ts.quads[&4], Rect::new(16.0, 16.0, 16.0, 16.0));

    let layer = map.contents[0].as_tile_layer().expect("tile layer");
    assert_eq!(layer.data, vec![1, 2, 3, 4]);
    assert_eq!(layer.data.len(), (layer.width * layer.height) as usize);
}

#[test]
fn error_on_layer_size_mismatch() {
    let xml = r#"
    <map width="2" height="2" tilewidth="8" tileheight="8">
      <layer name="oops" width="2" height="2">
        <data>1,2,3</data>
      </layer>
    </map>
    "#;
    let err = decode_tmx_str(xml).unwrap_err();
    assert!(matches!(err, MapError::InvalidLayerSize { layer, .. } if layer == "oops"));
}

#[test]
fn tile_ids_outside_every_tileset_resolve_to_none() {
    let map = decode_tmx_str(SCENARIO).expect("decode");
    assert!(map.tileset_for(0).is_none());
    assert!(map.tileset_for(5).is_none());
    assert!(map.tileset_for(99).is_none());
    assert!(map.tileset_for(1).is_some());
    assert!(map.tileset_for(4).is_some());
}

#[test]
fn load_ignores_unknown_elements_and_attributes() {
    let xml = r#"
    <map width="1" height="1" tilewidth="8" tileheight="8" dummyattr="ignored">
      <editorsettings><export target="."/></editorsettings>
      <layer name="L" width="1" height="1" opacity="0.5">
        <data>0</data>
      </layer>
    </map>
    "#;
    let map = decode_tmx_str(xml).expect("should ignore unknown elements");
    let layer = map.contents[0].as_tile_layer().unwrap();
    assert_eq!(layer.name, "L");
    assert_eq!(layer.opacity, 0.5);
    assert_eq!(layer.data, vec![0]);
}

#[test]
fn load_allows_empty_layer_name() {
    let xml = r#"
    <map width="1" height="1" tilewidth="8" tileheight="8">
      <layer width="1" height="1"><data>1</data></layer>
    </map>
    "#;
    let map = decode_tmx_str(xml).unwrap();
    assert_eq!(map.contents[0].name(), "");
}

fn assert_nodes_equal(a: &[Node], b: &[Node]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        match (x, y) {
            (Node::Layer(la), Node::Layer(lb)) => assert_eq!(la, lb),
            (Node::Objects(oa), Node::Objects(ob)) => assert_eq!(oa, ob),
            (Node::Image(ia), Node::Image(ib)) => {
                assert_eq!(ia.name, ib.name);
                assert_eq!(ia.image_source, ib.image_source);
                assert_eq!(ia.offset, ib.offset);
            }
            (Node::Group(ga), Node::Group(gb)) => {
                assert_eq!(ga.name, gb.name);
                assert_eq!(ga.opacity, gb.opacity);
                assert_eq!(ga.visible, gb.visible);
                assert_nodes_equal(&ga.contents, &gb.contents);
            }
            _ => panic!("node kinds differ"),
        }
    }
}

fn assert_structurally_equal(a: &TileMap, b: &TileMap) {
    assert_eq!(a.orientation, b.orientation);
    assert_eq!(a.render_order, b.render_order);
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert_eq!((a.tile_width, a.tile_height), (b.tile_width, b.tile_height));
    assert_eq!(a.infinite, b.infinite);
    assert_eq!(a.properties, b.properties);

    assert_eq!(a.tilesets.len(), b.tilesets.len());
    for (ta, tb) in a.tilesets.iter().zip(&b.tilesets) {
        assert_eq!(ta.first_gid, tb.first_gid);
        assert_eq!(ta.tile_count, tb.tile_count);
        assert_eq!(ta.image_source, tb.image_source);
        assert_eq!(ta.quads, tb.quads);
    }

    assert_nodes_equal(&a.contents, &b.contents);
}

#[test]
fn decoding_twice_yields_structurally_equal_maps() {
    let first = decode_tmx_str(SCENARIO).expect("decode");
    let second = decode_tmx_str(SCENARIO).expect("decode");
    assert_structurally_equal(&first, &second);
}
