use macroquad::prelude::*;
use macroquad_tmx::TileMap;

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
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

    loop {
        clear_background(BLACK);

        map.draw_to_screen();

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
