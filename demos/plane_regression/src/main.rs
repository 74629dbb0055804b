use argh::FromArgs;
use rand::{Rng, SeedableRng};

use depthrig::geom::{
    plane::{fit_plane, Plane},
    regressor::{homogeneous, train, LearningRate},
};

#[derive(FromArgs)]
/// Compare least-squares plane fitting with the online plane regressor
struct Args {
    /// number of training iterations of the regressor
    #[argh(option, default = "5000")]
    iterations: usize,

    /// number of synthetic points
    #[argh(option, default = "200")]
    num_points: usize,

    /// seed of the random generator
    #[argh(option, default = "42")]
    seed: u64,

    /// amplitude of the uniform noise added to the z coordinate
    #[argh(option, default = "0.01")]
    noise: f64,

    /// initial learning rate
    #[argh(option, default = "0.2")]
    rate: f64,

    /// exponential decay of the learning rate, constant if omitted
    #[argh(option)]
    decay: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);

    // ground truth: z = 0.5 x - 0.25 y + 1
    let truth = Plane::new(0.5, -0.25, -1.0, 1.0)?.normalized();
    let points = (0..args.num_points)
        .map(|_| {
            let x: f64 = rng.random_range(-2.0..2.0);
            let y: f64 = rng.random_range(-2.0..2.0);
            let noise = if args.noise > 0.0 {
                rng.random_range(-args.noise..args.noise)
            } else {
                0.0
            };
            [x, y, 0.5 * x - 0.25 * y + 1.0 + noise]
        })
        .collect::<Vec<_>>();
    log::info!("generated {} points", points.len());

    let least_squares = fit_plane(&points)?.normalized();
    println!("ground truth:  {:?}", truth.coefficients());
    println!(
        "least squares: {:?} (mean |distance| {:.6})",
        least_squares.coefficients(),
        least_squares.mean_abs_distance(&points)
    );

    let schedule = match args.decay {
        Some(decay) => LearningRate::Decaying {
            initial: args.rate,
            decay,
        },
        None => LearningRate::Constant(args.rate),
    };

    let samples = homogeneous(&points);
    let state = train(&samples, schedule, args.iterations, &mut rng)?;
    let regressed = state.to_plane()?.normalized();
    println!(
        "regressor:     {:?} (mean |distance| {:.6}, mean |residual| {:.6})",
        regressed.coefficients(),
        regressed.mean_abs_distance(&points),
        state.mean_abs_error(&samples)?
    );

    Ok(())
}
