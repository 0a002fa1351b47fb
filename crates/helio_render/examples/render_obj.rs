//! Renders an OBJ/MTL scene to a PNG file.
//!
//! Usage: `render_obj <scene.obj> <scene.mtl> [output.png]`

use std::f64::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use helio_math::{axis_rotation, DMat4, DVec3};
use helio_render::{render, MeshScene, Perspective, Png8, RenderSettings};
use log::info;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(obj_path), Some(mtl_path)) = (args.next(), args.next()) else {
        eprintln!("usage: render_obj <scene.obj> <scene.mtl> [output.png]");
        std::process::exit(2);
    };
    let output_path = args.next().unwrap_or_else(|| String::from("output.png"));

    let obj_file = match File::open(&obj_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open {obj_path}: {err}");
            std::process::exit(1);
        }
    };
    let mtl_file = match File::open(&mtl_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open {mtl_path}: {err}");
            std::process::exit(1);
        }
    };

    let load_start = Instant::now();
    let mesh = match helio_core::obj::load(obj_file, mtl_file) {
        Ok(mesh) => mesh,
        Err(err) => {
            eprintln!("failed to load scene: {err}");
            std::process::exit(1);
        }
    };
    let scene = MeshScene::new(&mesh);
    info!(
        "scene ready in {:.2?} ({} triangles)",
        load_start.elapsed(),
        scene.triangle_count()
    );

    // Look down at the origin from above and behind, with a narrow
    // field of view and a slight lens blur focused on the subject.
    let camera_matrix = axis_rotation(DVec3::Y, PI)
        * axis_rotation(DVec3::X, PI / 4.3)
        * DMat4::from_translation(DVec3::new(0.0, 5.0, 5.0));
    let camera = Perspective::new()
        .with_field_of_view(20.0)
        .with_transform(camera_matrix)
        .with_depth_of_field(6.666, 0.07);

    let mut image = Png8::new(512, 512);
    let settings = RenderSettings {
        bounce_depth: 5,
        samples_per_ray: 200,
    };

    let render_start = Instant::now();
    render(&scene, &camera, &mut image, &settings);
    info!("rendered in {:.2?}", render_start.elapsed());

    let file = match File::create(&output_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot create {output_path}: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = image.write(BufWriter::new(file)) {
        eprintln!("failed to encode {output_path}: {err}");
        std::process::exit(1);
    }
    info!("wrote {output_path}");
}
