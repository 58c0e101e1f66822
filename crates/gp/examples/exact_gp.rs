use gpkit::{mean_models::ZeroMean, ExactInferenceGp, IsotropicKernel, SquaredExponential};
use linfa::prelude::*;
use ndarray::{arr2, Array, Array1, Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn xsinx(x: &Array2<f64>) -> Array1<f64> {
    ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
}

fn main() {
    env_logger::init();

    let xtrain = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
    let ytrain = xsinx(&xtrain);

    let kernel = SquaredExponential::new(5., 4.);
    println!("prior kernel: {kernel}");
    let cov = kernel.self_covariance(&[0., 5., 10.]).expect("Kernel evaluation");
    println!("prior covariance at [0, 5, 10]:\n{}", cov.into_matrix());

    let gp = ExactInferenceGp::<f64, ZeroMean, SquaredExponential<f64>>::params(ZeroMean(), kernel)
        .noise_var(1e-4)
        .fit(&Dataset::new(xtrain, ytrain))
        .expect("GP fitting");
    println!("{gp}");

    let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
    let predictive = gp.predictive(&xtest).expect("GP predictive");
    let (lower, upper) = predictive.confidence_region();
    for (i, x) in xtest.column(0).iter().enumerate() {
        println!(
            "x={:>5.1} y={:>8.4} [{:>8.4}, {:>8.4}]",
            x,
            predictive.mean()[i],
            lower[i],
            upper[i]
        );
    }

    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let trajectories = predictive.sample(3, &mut rng).expect("GP sampling");
    println!("predictive samples shape: {:?}", trajectories.dim());
}
