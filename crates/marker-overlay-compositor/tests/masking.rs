use marker_overlay_compositor::{composite, composite_layers};
use marker_overlay_core::{ColorImage, Quad};
use marker_overlay_markers::{resolve, MarkerDetection, MarkerLayout};
use nalgebra::Point2;

fn textured(w: usize, h: usize, seed: u8) -> ColorImage {
    let mut img = ColorImage::zeros(w, h, 3);
    for y in 0..h {
        for x in 0..w {
            img.pixel_mut(x, y).copy_from_slice(&[
                (x as u8).wrapping_add(seed),
                (y as u8).wrapping_mul(2),
                seed ^ (x as u8),
            ]);
        }
    }
    img
}

/// Signed distance to a clockwise (in image coordinates) convex polygon;
/// positive inside.
fn signed_distance(p: Point2<f64>, quad: &Quad) -> f64 {
    let mut best = f64::INFINITY;
    for i in 0..4 {
        let a = quad.corners[i];
        let b = quad.corners[(i + 1) % 4];
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (ex, ey) = (b.x as f64 - ax, b.y as f64 - ay);
        let cross = ex * (p.y - ay) - ey * (p.x - ax);
        best = best.min(cross / (ex * ex + ey * ey).sqrt());
    }
    best
}

fn perspective_quad() -> Quad {
    Quad::new([
        Point2::new(20.0, 15.0),
        Point2::new(100.0, 10.0),
        Point2::new(110.0, 80.0),
        Point2::new(15.0, 70.0),
    ])
}

#[test]
fn pixels_outside_the_quad_keep_the_target() {
    let target = textured(120, 90, 11);
    let source = textured(40, 30, 170);
    let quad = perspective_quad();

    let out = composite(&target.view(), &source.view(), &quad).expect("composite");
    let mut checked = 0;
    for y in 0..target.height {
        for x in 0..target.width {
            if signed_distance(Point2::new(x as f64, y as f64), &quad) < -1.5 {
                assert_eq!(out.pixel(x, y), target.pixel(x, y), "pixel ({x},{y})");
                checked += 1;
            }
        }
    }
    assert!(checked > 1000);
}

#[test]
fn pixels_inside_the_quad_come_from_the_warp() {
    let target = textured(120, 90, 11);
    let source = textured(40, 30, 170);
    let quad = perspective_quad();

    let layers = composite_layers(&target.view(), &source.view(), &quad).expect("composite");
    let mut checked = 0;
    for y in 0..target.height {
        for x in 0..target.width {
            if signed_distance(Point2::new(x as f64, y as f64), &quad) > 1.5 {
                assert_eq!(layers.mask.get(x, y), 255);
                assert_eq!(
                    layers.output.pixel(x, y),
                    layers.warped.pixel(x, y),
                    "pixel ({x},{y})"
                );
                checked += 1;
            }
        }
    }
    assert!(checked > 1000);
}

#[test]
fn warp_corners_land_on_the_quad() {
    let target = textured(120, 90, 0);
    let source = textured(40, 30, 0);
    let quad = perspective_quad();

    let layers = composite_layers(&target.view(), &source.view(), &quad).expect("composite");
    for (src, dst) in Quad::from_size(40, 30).corners.iter().zip(quad.corners) {
        let mapped = layers.homography.apply(*src);
        assert!((mapped.x - dst.x).abs() < 1e-3 && (mapped.y - dst.y).abs() < 1e-3);
    }
}

#[test]
fn solid_red_source_fills_card_region_exactly() {
    // 800x600 scene, reference card spanning 400x300 at (100, 100).
    let target = textured(800, 600, 3);
    let red = ColorImage::filled(50, 50, &[255, 0, 0]);
    let detections = vec![
        MarkerDetection::square(1001, 460.0, 100.0, 40.0),
        MarkerDetection::square(241, 460.0, 360.0, 40.0),
        MarkerDetection::square(923, 100.0, 100.0, 40.0),
        MarkerDetection::square(1007, 100.0, 360.0, 40.0),
    ];

    let quad = resolve(&detections, &MarkerLayout::default()).expect("resolve");
    let out = composite(&target.view(), &red.view(), &quad).expect("composite");

    assert_eq!((out.width, out.height, out.channels), (800, 600, 3));
    for y in 0..600 {
        for x in 0..800 {
            let inside = (100..=500).contains(&x) && (100..=400).contains(&y);
            if inside {
                assert_eq!(out.pixel(x, y), &[255, 0, 0], "pixel ({x},{y})");
            } else {
                assert_eq!(out.pixel(x, y), target.pixel(x, y), "pixel ({x},{y})");
            }
        }
    }
}
