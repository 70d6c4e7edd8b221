use macroquad::prelude::*;
use macroquad_tmx::TileMap;

fn window_conf() -> Conf {
    Conf {
        window_title: "Objects Example".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let map = TileMap::load("assets/map.tmx")
        .await
        .expect("Failed to load map");

    println!("spawns: {}", map.get_objects_from_class("spawn").len());
    if let Some(start) = map.get_object_from_name("start") {
        println!("start at {:?}", start.bounds.point());
    }

    loop {
        clear_background(BLACK);

        map.draw_to_screen();

        // outline every object under the cursor
        let (mx, my) = mouse_position();
        for object in map.get_objects_from_coord(vec2(mx, my)) {
            draw_rectangle_lines(
                object.bounds.x,
                object.bounds.y,
                object.bounds.w,
                object.bounds.h,
                2.0,
                YELLOW,
            );
        }

        draw_text("objects example", 20.0, 30.0, 32.0, WHITE);
        next_frame().await;
    }
}
