//! The precision-adaptive sweep over determinant orders.
//!
//! Each D seeds its solve from the previous converged root, and how far the
//! root moved decides the tolerance, step size, and digit count used for the
//! next D. Digits only ever increase: a root refined at low precision is not
//! a trustworthy seed for a higher-precision refinement, so the policy never
//! backs off.

use nalgebra::SVector;
use thiserror::Error;

use crate::hankel;
use crate::series::Equation;
use crate::solver::{NewtonSolver, SolveError};
use crate::traits::{Precision, Real};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Dmin should be at least 3 (got {0})")]
    DminTooSmall(u32),
    #[error("Dmax should be at least 3 (got {0})")]
    DmaxTooSmall(u32),
    #[error("Dstep should be at least 1")]
    ZeroDstep,
    #[error("ndigits should be at least 15 (got {0})")]
    TooFewDigits(u32),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("the Newton-Raphson method failed to converge for {failures} consecutive D values")]
    Aborted { failures: u32 },
}

/// Where the sweep stands with respect to solver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStatus {
    Running,
    Degraded,
    Aborted,
}

/// One converged D step, reported with the parameters that produced it.
#[derive(Debug, Clone)]
pub struct SweepRecord<R> {
    pub d: u32,
    pub root: R,
    /// |root − previous root|.
    pub delta: R,
    pub digits: u32,
    pub tol: R,
    pub step: R,
    pub iterations: usize,
}

#[derive(Debug, Clone)]
pub enum SweepEvent<R> {
    Converged(SweepRecord<R>),
    Failed { d: u32, max_iter: usize },
}

#[derive(Debug, Clone)]
pub struct SweepSettings<R> {
    pub equation: Equation,
    /// Trim offset d; defaults to the equation variant's value.
    pub offset: Option<usize>,
    pub d_min: u32,
    pub d_max: Option<u32>,
    pub d_step: u32,
    /// Starting significant digits (at least 15).
    pub digits: u32,
    pub tol: R,
    pub step: R,
    pub max_iter: usize,
    /// Seed for the free parameter at the first D.
    pub x0: R,
    /// Display precision for per-iteration solver logging, if wanted.
    pub log_digits: Option<usize>,
}

/// Drives the D loop and owns every adaptive parameter.
///
/// The controller is the sole mutator of the working precision: it re-rounds
/// the carried root, tolerance, and step *before* the next D constructs any
/// value at the escalated digit count.
pub struct Sweep<R: Real> {
    equation: Equation,
    offset: usize,
    d_min: u32,
    d_max: Option<u32>,
    d_step: u32,
    prec: Precision,
    tol: R,
    step: R,
    max_iter: usize,
    x: R,
    log_digits: Option<usize>,
    failures: u32,
    status: SweepStatus,
}

impl<R: Real> Sweep<R> {
    pub fn new(settings: SweepSettings<R>) -> Result<Self, ConfigError> {
        if settings.d_min < 3 {
            return Err(ConfigError::DminTooSmall(settings.d_min));
        }
        if let Some(d_max) = settings.d_max {
            if d_max < 3 {
                return Err(ConfigError::DmaxTooSmall(d_max));
            }
        }
        if settings.d_step == 0 {
            return Err(ConfigError::ZeroDstep);
        }
        if settings.digits < 15 {
            return Err(ConfigError::TooFewDigits(settings.digits));
        }

        let offset = settings
            .offset
            .unwrap_or_else(|| settings.equation.default_offset());
        Ok(Self {
            equation: settings.equation,
            offset,
            d_min: settings.d_min,
            d_max: settings.d_max,
            d_step: settings.d_step,
            prec: Precision::new(settings.digits),
            tol: settings.tol,
            step: settings.step,
            max_iter: settings.max_iter,
            x: settings.x0,
            log_digits: settings.log_digits,
            failures: 0,
            status: SweepStatus::Running,
        })
    }

    pub fn status(&self) -> SweepStatus {
        self.status
    }

    pub fn precision(&self) -> Precision {
        self.prec
    }

    pub fn root(&self) -> &R {
        &self.x
    }

    /// Walks D = Dmin, Dmin+Dstep, … (unbounded without a Dmax), reporting
    /// each step through `on_event`. Returns early with
    /// [`SweepError::Aborted`] after three consecutive solver failures.
    pub fn run<F>(&mut self, mut on_event: F) -> Result<(), SweepError>
    where
        F: FnMut(&SweepEvent<R>),
    {
        let mut d = self.d_min;
        loop {
            if let Some(d_max) = self.d_max {
                if d > d_max {
                    return Ok(());
                }
            }
            self.step_d(d, &mut on_event)?;
            d += self.d_step;
        }
    }

    fn step_d<F>(&mut self, d: u32, on_event: &mut F) -> Result<(), SweepError>
    where
        F: FnMut(&SweepEvent<R>),
    {
        let residual = hankel::residual(self.equation, d as usize, self.offset, self.prec);
        let mut solver = NewtonSolver::new([residual], self.tol.clone(), self.step.clone());
        solver.set_max_iter(self.max_iter);
        if let Some(digits) = self.log_digits {
            solver.set_log(digits);
        }

        match solver.solve(SVector::from([self.x.clone()])) {
            Ok(result) => {
                self.failures = 0;
                self.status = SweepStatus::Running;

                let root = result.x[0].clone();
                let delta = (root.clone() - &self.x).abs();
                self.x = root;
                self.escalate(&delta);

                on_event(&SweepEvent::Converged(SweepRecord {
                    d,
                    root: self.x.clone(),
                    delta,
                    digits: self.prec.digits(),
                    tol: self.tol.clone(),
                    step: self.step.clone(),
                    iterations: result.iterations,
                }));
                Ok(())
            }
            Err(SolveError::Exhausted { max_iter }) => {
                self.failures += 1;
                self.status = SweepStatus::Degraded;
                on_event(&SweepEvent::Failed { d, max_iter });

                if self.failures >= 3 {
                    self.status = SweepStatus::Aborted;
                    return Err(SweepError::Aborted {
                        failures: self.failures,
                    });
                }
                Ok(())
            }
        }
    }

    /// Tightens tolerance and step from how far the root moved, then raises
    /// the digit count to cover both. A delta of exactly zero carries no
    /// magnitude information and leaves every parameter as it was.
    fn escalate(&mut self, delta: &R) {
        let Some(delta_mag) = delta.floor_log10() else {
            return;
        };

        let tenth_orders = R::with_prec(self.prec, 1e10);
        let tightened = delta.clone() / tenth_orders;
        if tightened < self.tol {
            self.tol = tightened;
        }
        self.step = self.tol.clone() * &self.tol;

        let mut digits = i64::from(self.prec.digits());
        digits = digits.max(-delta_mag * 4);
        if let Some(step_mag) = self.step.floor_log10() {
            digits = digits.max(-2 * step_mag);
        }
        self.prec = Precision::new(digits as u32);

        // Values carry the precision they were constructed at; re-round the
        // carried state now so the next D starts at the escalated width.
        self.x = self.x.at_prec(self.prec);
        self.tol = self.tol.at_prec(self.prec);
        self.step = self.step.at_prec(self.prec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::Float;

    fn f64_settings() -> SweepSettings<f64> {
        SweepSettings {
            equation: Equation::Isolated,
            offset: None,
            d_min: 3,
            d_max: Some(5),
            d_step: 1,
            digits: 15,
            tol: 1e-6,
            step: 1e-8,
            max_iter: 30,
            x0: -0.8,
            log_digits: None,
        }
    }

    #[test]
    fn rejects_invalid_configuration_before_solving() {
        let mut settings = f64_settings();
        settings.d_min = 2;
        assert_eq!(
            Sweep::new(settings).err(),
            Some(ConfigError::DminTooSmall(2))
        );

        let mut settings = f64_settings();
        settings.digits = 14;
        assert_eq!(
            Sweep::new(settings).err(),
            Some(ConfigError::TooFewDigits(14))
        );

        let mut settings = f64_settings();
        settings.d_max = Some(2);
        assert_eq!(
            Sweep::new(settings).err(),
            Some(ConfigError::DmaxTooSmall(2))
        );

        let mut settings = f64_settings();
        settings.d_step = 0;
        assert_eq!(Sweep::new(settings).err(), Some(ConfigError::ZeroDstep));

        assert!(Sweep::new(f64_settings()).is_ok());
    }

    #[test]
    fn three_consecutive_failures_abort_the_sweep() {
        // A zero iteration budget can never converge, for any D.
        let mut settings = f64_settings();
        settings.max_iter = 0;
        settings.d_max = Some(100);

        let mut events = Vec::new();
        let mut sweep = Sweep::new(settings).unwrap();
        let err = sweep.run(|event| events.push(event.clone())).unwrap_err();

        assert_eq!(err, SweepError::Aborted { failures: 3 });
        assert_eq!(sweep.status(), SweepStatus::Aborted);
        let failed: Vec<u32> = events
            .iter()
            .map(|event| match event {
                SweepEvent::Failed { d, max_iter: 0 } => *d,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        // Exactly three, at consecutive D values, and the sweep stops there.
        assert_eq!(failed, vec![3, 4, 5]);
    }

    #[test]
    fn successful_sweep_escalates_monotonically() {
        let prec = Precision::new(40);
        let settings = SweepSettings::<Float> {
            equation: Equation::Isolated,
            offset: None,
            d_min: 3,
            d_max: Some(6),
            d_step: 1,
            digits: 40,
            tol: <Float as Real>::parse(prec, "1E-10").unwrap(),
            step: <Float as Real>::parse(prec, "1E-20").unwrap(),
            max_iter: 50,
            x0: <Float as Real>::parse(prec, "-0.8").unwrap(),
            log_digits: None,
        };

        let mut records = Vec::new();
        let mut sweep = Sweep::new(settings).unwrap();
        sweep
            .run(|event| match event {
                SweepEvent::Converged(record) => records.push(record.clone()),
                SweepEvent::Failed { d, .. } => panic!("D = {d} failed to converge"),
            })
            .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(sweep.status(), SweepStatus::Running);
        for pair in records.windows(2) {
            assert!(pair[1].digits >= pair[0].digits, "digits went down");
            assert!(pair[1].tol <= pair[0].tol, "tolerance loosened");
            assert!(pair[1].step <= pair[0].step, "step grew");
        }
        // The doubled root approaches the known slope of the isolated
        // equation; even the first orders pin down the leading digits.
        let slope = 2.0 * Real::to_f64(&records.last().unwrap().root);
        assert!((slope + 1.588).abs() < 5e-3, "slope was {slope}");
    }

    #[test]
    fn escalation_waits_for_a_converged_step() {
        // The carried precision is untouched while D fails.
        let mut settings = f64_settings();
        settings.max_iter = 0;
        settings.d_max = Some(4);
        let mut sweep = Sweep::new(settings).unwrap();
        let _ = sweep.run(|_| {});
        assert_eq!(sweep.precision(), Precision::new(15));
    }
}
