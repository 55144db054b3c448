mod demo_scene;

use demo_scene::DemoScene;

fn main() {
    if let Err(err) = skyshade::run(DemoScene::new()) {
        eprintln!("Application error: {err}");
    }
}
