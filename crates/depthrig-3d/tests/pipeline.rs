use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};

use depthrig_3d::{
    camera::{DepthToWorld, FovIntrinsics},
    correspondence::{search_correspondence, SearchParams},
    depth::{depth_pixels_to_world, DepthFrame, NO_DEPTH},
    homography::{apply_homography, homography_4pt},
    linalg,
    plane::{fit_plane, plane_from_points},
    regressor::{homogeneous, train, LearningRate},
    rigid::{fit_rigid_transform, RigidTransform},
    GeometryError,
};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// Frames of a constant scene with random dropouts.
fn noisy_frames(rng: &mut impl Rng, num_frames: usize, depth: u16) -> Vec<DepthFrame> {
    (0..num_frames)
        .map(|_| {
            let data = (0..WIDTH * HEIGHT)
                .map(|_| {
                    if rng.random_bool(0.2) {
                        NO_DEPTH
                    } else {
                        depth
                    }
                })
                .collect();
            DepthFrame::new(WIDTH, HEIGHT, data)
        })
        .collect::<Result<Vec<_>, _>>()
        .expect("frame size is consistent")
}

#[test]
fn frames_to_rigid_alignment() -> Result<(), GeometryError> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let frames = noisy_frames(&mut rng, 6, 1500);
    let intrinsics = FovIntrinsics::kinect_v1();

    let pixels = [[40, 30], [600, 50], [320, 240], [100, 400], [500, 420], [250, 120]];
    let points = depth_pixels_to_world(&frames, &pixels, &intrinsics)?;
    assert_eq!(points.len(), pixels.len());
    // dropouts are filtered out by the temporal median
    let expected_first = intrinsics.depth_to_world(40.0, 30.0, 1500.0)?;
    assert_relative_eq!(points[0][0], expected_first[0], epsilon = 1e-9);

    let (c, s) = (0.3f64.cos(), 0.3f64.sin());
    let expected = RigidTransform {
        rotation: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        translation: [100.0, -50.0, 20.0],
    };
    let mut moved = vec![[0.0; 3]; points.len()];
    linalg::transform_points(&points, &expected.rotation, &expected.translation, &mut moved)?;

    let transform = fit_rigid_transform(&points, &moved)?;
    for i in 0..3 {
        assert_relative_eq!(transform.translation[i], expected.translation[i], epsilon = 1e-5);
        for j in 0..3 {
            assert_relative_eq!(transform.rotation[i][j], expected.rotation[i][j], epsilon = 1e-8);
        }
    }
    Ok(())
}

#[test]
fn regressor_agrees_with_least_squares() -> Result<(), GeometryError> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    // z = 0.4 x + 0.1 y - 0.5
    let points = (0..300)
        .map(|_| {
            let x = rng.random_range(-1.0..1.0);
            let y = rng.random_range(-1.0..1.0);
            [x, y, 0.4 * x + 0.1 * y - 0.5]
        })
        .collect::<Vec<_>>();

    let exact = plane_from_points(&[points[0], points[1], points[2]])?.normalized();
    let least_squares = fit_plane(&points)?.normalized();
    let regressed = train(
        &homogeneous(&points),
        LearningRate::Constant(0.2),
        4000,
        &mut rng,
    )?
    .to_plane()?
    .normalized();

    for other in [exact, regressed] {
        let sign = if other.coefficients()[2] * least_squares.coefficients()[2] < 0.0 {
            -1.0
        } else {
            1.0
        };
        for (a, b) in other.coefficients().iter().zip(least_squares.coefficients()) {
            assert_relative_eq!(sign * a, b, epsilon = 2e-3);
        }
    }
    Ok(())
}

#[test]
fn homography_drives_correspondence_search() -> Result<(), GeometryError> {
    // the depth to color mapping of a rig whose color camera sees a shifted view
    let depth_corners = [[100.0, 100.0], [500.0, 100.0], [100.0, 400.0], [500.0, 400.0]];
    let color_corners = [[110.0, 95.0], [510.0, 95.0], [110.0, 395.0], [510.0, 395.0]];
    let homo = homography_4pt(&depth_corners, &color_corners)?;

    let project = |p: [i64; 2], _depth: u16| -> [i64; 2] {
        match apply_homography(&homo, &[[p[0] as f64, p[1] as f64]]) {
            Ok(mapped) => [mapped[0][0].round() as i64, mapped[0][1].round() as i64],
            Err(_) => [i64::MAX, i64::MAX],
        }
    };

    let frame = DepthFrame::from_value(WIDTH, HEIGHT, 1000);
    let result = search_correspondence([300, 200], &frame, &project, &SearchParams::default())?;
    assert!(result.exact);
    assert_eq!(result.pixel, [290, 205]);
    Ok(())
}
