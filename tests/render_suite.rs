use line_art::geometry::{Point, Size};
use line_art::render::{path_data, render_to_string, AsciiRenderer, Renderer, SvgRenderer};
use line_art::scene::{Path, Scene};

/// Scene whose single closed path covers the whole canvas.
fn solid_scene(fill: &str) -> Scene {
    let mut scene = Scene::new(Size::new(100.0, 100.0));
    scene.add_path(
        Path::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            true,
        )
        .with_fill(fill),
    );
    scene
}

#[test]
fn straight_paths_use_line_segments() {
    let open = Path::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 5.5)], false);
    assert_eq!(path_data(&open), "M0 0 L10 5.5");

    let closed = Path::new(
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.126),
        ],
        true,
    );
    assert_eq!(path_data(&closed), "M0 0 L10 0 L5 8.13 Z");
    assert_eq!(path_data(&Path::new(Vec::new(), false)), "");
}

#[test]
fn curved_paths_pass_through_every_vertex() {
    let pts = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(20.0, 0.0),
    ];
    let open = Path::new(pts.clone(), false).with_curved(true);
    let d = path_data(&open);
    assert!(d.starts_with("M0 0 C"));
    assert_eq!(d.matches(" C").count(), 2);
    assert!(d.ends_with(" 20 0"));

    let closed = Path::new(pts, true).with_curved(true);
    let d = path_data(&closed);
    assert_eq!(d.matches(" C").count(), 3);
    assert!(d.ends_with(" 0 0 Z"));

    // Two points have nothing to smooth.
    let short = Path::new(vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)], false).with_curved(true);
    assert_eq!(path_data(&short), "M0 0 L4 4");
}

#[test]
fn svg_group_translates_and_skips_empty_paths() {
    let mut scene = Scene::new(Size::new(10.0, 10.0)).with_translation(Point::new(100.0, 100.0));
    scene.add_path(Path::new(Vec::new(), false));
    scene.add_path(
        Path::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)], false)
            .with_stroke("#ff0000", 1.5),
    );

    let mut svg = SvgRenderer::new();
    assert_eq!(svg.name(), "svg");
    let out = render_to_string(&mut svg, &scene).expect("render should succeed");
    assert_eq!(
        out,
        "<g transform=\"translate(100 100)\">\n\
         <path d=\"M0 0 L5 5\" fill=\"none\" stroke=\"#ff0000\" stroke-width=\"1.5\"/>\n\
         </g>\n"
    );
}

#[test]
fn ascii_output_has_requested_dimensions() {
    let mut renderer = AsciiRenderer::plain(10, 5);
    let out = render_to_string(&mut renderer, &solid_scene("#ffffff")).expect("render");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        assert_eq!(line, "@@@@@@@@@@");
    }
}

#[test]
fn ascii_background_only_scene_is_blank() {
    let scene = Scene::new(Size::new(40.0, 20.0));
    let out = render_to_string(&mut AsciiRenderer::plain(8, 3), &scene).expect("render");
    assert_eq!(out, "        \n        \n        \n");
}

#[test]
fn ascii_strokes_show_on_background() {
    let mut scene = Scene::new(Size::new(100.0, 100.0));
    scene.add_path(
        Path::new(vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)], false)
            .with_stroke("#ffffff", 1.0),
    );
    let out = render_to_string(&mut AsciiRenderer::plain(20, 10), &scene).expect("render");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[5], "@".repeat(20));
    assert_eq!(lines[0], " ".repeat(20));
}

#[test]
fn ansi_preview_emits_color_and_reset() {
    let mut renderer = AsciiRenderer::new(4, 2);
    assert_eq!(renderer.name(), "ascii");
    let out = render_to_string(&mut renderer, &solid_scene("hsl(0,100%,50%)")).expect("render");
    assert!(out.contains("\x1b[38;2;255;0;0m"));
    assert_eq!(out.matches("\x1b[0m\n").count(), 2);
}

#[test]
fn undrawable_canvas_renders_nothing() {
    let scene = Scene::new(Size::new(0.0, 0.0));
    let out = render_to_string(&mut AsciiRenderer::plain(8, 4), &scene).expect("render");
    assert!(out.is_empty());
}
