//! hankpad command-line interface.
//!
//! Sweeps the Hankel determinant order D, solving H_D = 0 for the free
//! series coefficient at each order and escalating the working precision as
//! the root settles:
//! ```sh
//! hankpad --dmax 20
//! hankpad --strong-field --x0 -2.0 --digits 60
//! hankpad --dmax 12 --json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use hankpad_core::series::Equation;
use hankpad_core::sweep::{Sweep, SweepEvent, SweepRecord, SweepSettings};
use hankpad_core::traits::{Precision, Real};
use rug::Float;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "hankpad")]
#[command(about = "Hankel-Pade root sweeper with adaptive precision")]
#[command(version)]
struct Cli {
    /// Initial value of the second coefficient in the expansion of f(x).
    #[arg(long, default_value = "-1.6", allow_hyphen_values = true)]
    x0: String,

    /// Starting D value.
    #[arg(long, default_value_t = 3)]
    dmin: u32,

    /// Maximum D value; negative means the sweep is unbounded.
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    dmax: i64,

    /// Distance between successive D values.
    #[arg(long, default_value_t = 1)]
    dstep: u32,

    /// Trim offset d (defaults to 3, or 4 with --strong-field).
    #[arg(long = "d")]
    offset: Option<usize>,

    /// Starting number of significant digits; precision, tolerance, and
    /// step size all escalate automatically from here.
    #[arg(long, default_value_t = 40)]
    digits: u32,

    /// Starting tolerance for the Newton-Raphson method.
    #[arg(long, default_value = "1E-10")]
    tol: String,

    /// Starting step size for the Newton-Raphson method.
    #[arg(long = "step-size", default_value = "1E-20")]
    step_size: String,

    /// Maximum number of Newton-Raphson iterations per D.
    #[arg(long, default_value_t = 20)]
    max_iter: usize,

    /// Print each Newton-Raphson iterate.
    #[arg(long)]
    log_nr: bool,

    /// Solve the equation for atoms in a strong magnetic field instead.
    #[arg(long)]
    strong_field: bool,

    /// Emit one JSON object per D instead of formatted text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent {
    Converged {
        d: u32,
        root: String,
        delta: String,
        digits: u32,
        tol: String,
        h: String,
        iterations: usize,
    },
    Failed {
        d: u32,
        max_iter: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.log_nr {
        logger.filter_module("hankpad_core::solver", log::LevelFilter::Debug);
    }
    logger.init();

    let equation = if cli.strong_field {
        Equation::StrongField
    } else {
        Equation::Isolated
    };

    let prec = Precision::new(cli.digits);
    let x0 = <Float as Real>::parse(prec, &cli.x0)
        .with_context(|| format!("invalid --x0 value {:?}", cli.x0))?;
    let tol = <Float as Real>::parse(prec, &cli.tol)
        .with_context(|| format!("invalid --tol value {:?}", cli.tol))?;
    let step = <Float as Real>::parse(prec, &cli.step_size)
        .with_context(|| format!("invalid --step-size value {:?}", cli.step_size))?;

    let settings = SweepSettings {
        equation,
        offset: cli.offset,
        d_min: cli.dmin,
        d_max: (cli.dmax >= 0).then_some(cli.dmax as u32),
        d_step: cli.dstep,
        digits: cli.digits,
        tol,
        step,
        max_iter: cli.max_iter,
        // The solved coefficient is half the physical slope; seed
        // accordingly and double on output.
        x0: x0 / 2u32,
        log_digits: cli.log_nr.then_some(cli.digits as usize),
    };

    let mut sweep = Sweep::new(settings)?;
    let json = cli.json;
    sweep.run(|event| report(event, json))?;
    Ok(())
}

fn report(event: &SweepEvent<Float>, json: bool) {
    if json {
        let row = match event {
            SweepEvent::Converged(rec) => JsonEvent::Converged {
                d: rec.d,
                root: format!("{:.*e}", rec.digits as usize, scaled_root(rec)),
                delta: format!("{:.4e}", rec.delta),
                digits: rec.digits,
                tol: format!("{:.4e}", rec.tol),
                h: format!("{:.4e}", rec.step),
                iterations: rec.iterations,
            },
            SweepEvent::Failed { d, max_iter } => JsonEvent::Failed {
                d: *d,
                max_iter: *max_iter,
            },
        };
        if let Ok(line) = serde_json::to_string(&row) {
            println!("{line}");
        }
        return;
    }

    match event {
        SweepEvent::Converged(rec) => {
            let digits = rec.digits as usize;
            println!(
                "D = {:>3} {:<width$.digits$} {:>12.4e} digits: {} tol: {:.4e} h: {:.4e}",
                rec.d,
                scaled_root(rec),
                rec.delta,
                rec.digits,
                rec.tol,
                rec.step,
                width = digits + 5,
            );
        }
        SweepEvent::Failed { d, max_iter } => {
            println!("Newton-Raphson failed after {max_iter} iterations for D = {d}.");
        }
    }
}

fn scaled_root(rec: &SweepRecord<Float>) -> Float {
    rec.root.clone() * 2u32
}
