use argh::FromArgs;
use rand::{Rng, SeedableRng};

use depthrig::geom::{
    linalg,
    rigid::{fit_rigid_transform, RigidTransform},
};

#[derive(FromArgs)]
/// Recover a known rigid transformation from noisy point correspondences
struct Args {
    /// number of synthetic points
    #[argh(option, default = "100")]
    num_points: usize,

    /// seed of the random generator
    #[argh(option, default = "0")]
    seed: u64,

    /// amplitude of the uniform noise added to the destination points
    #[argh(option, default = "1.0")]
    noise: f64,

    /// yaw of the ground truth rotation in degrees
    #[argh(option, default = "30.0")]
    yaw: f64,

    /// pitch of the ground truth rotation in degrees
    #[argh(option, default = "-15.0")]
    pitch: f64,
}

fn rotation_from_yaw_pitch(yaw: f64, pitch: f64) -> [[f64; 3]; 3] {
    let (sy, cy) = yaw.to_radians().sin_cos();
    let (sp, cp) = pitch.to_radians().sin_cos();
    let rz = [[cy, -sy, 0.0], [sy, cy, 0.0], [0.0, 0.0, 1.0]];
    let rx = [[1.0, 0.0, 0.0], [0.0, cp, -sp], [0.0, sp, cp]];
    linalg::matmul33(&rz, &rx)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);

    let truth = RigidTransform {
        rotation: rotation_from_yaw_pitch(args.yaw, args.pitch),
        translation: [250.0, -120.0, 40.0],
    };

    // points in millimeters, as read from a depth camera
    let src = (0..args.num_points)
        .map(|_| {
            [
                rng.random_range(-1000.0..1000.0),
                rng.random_range(-800.0..800.0),
                rng.random_range(500.0..4000.0),
            ]
        })
        .collect::<Vec<_>>();

    let mut dst = vec![[0.0; 3]; src.len()];
    linalg::transform_points(&src, &truth.rotation, &truth.translation, &mut dst)?;
    if args.noise > 0.0 {
        for p in dst.iter_mut().flatten() {
            *p += rng.random_range(-args.noise..args.noise);
        }
    }
    log::info!("generated {} correspondences", src.len());

    let estimate = fit_rigid_transform(&src, &dst)?;
    println!("ground truth: {:?}", truth);
    println!("estimate:     {:?}", estimate);
    println!("rmse:         {:.6}", estimate.rmse(&src, &dst)?);
    println!(
        "round trip:   {:.6}",
        estimate.inverse().rmse(&dst, &src)?
    );

    Ok(())
}
