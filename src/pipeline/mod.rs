use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::error::Error;
use crate::plate::Plate;

pub mod stage1_normalize;
pub mod stage2_reference;
pub mod stage3_regression;
pub mod stage4_software;
pub mod stage5_finalize;

use stage1_normalize::Stage1Normalize;
use stage2_reference::Stage2Reference;
use stage3_regression::Stage3Regression;
use stage4_software::Stage4Software;
use stage5_finalize::Stage5Finalize;

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl RunState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => RunState::Idle,
            1 => RunState::Running,
            2 => RunState::Completed,
            3 => RunState::Cancelled,
            _ => RunState::Failed,
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    // the dataset leaves the executor only through this variant
    Completed(Box<Ctx>),
    Cancelled,
    Busy,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

pub struct PipelineExecutor {
    stages: Vec<Box<dyn Stage>>,
    busy: AtomicBool,
    state: AtomicU8,
}

impl PipelineExecutor {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            busy: AtomicBool::new(false),
            state: AtomicU8::new(RunState::Idle as u8),
        }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Stage1Normalize::new()),
            Box::new(Stage2Reference::new()),
            Box::new(Stage3Regression::new()),
            Box::new(Stage4Software::new()),
            Box::new(Stage5Finalize::new()),
        ])
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn run<P, C>(&self, ctx: Ctx, mut progress: P, is_cancelled: C) -> Result<RunOutcome>
    where
        P: FnMut(u8, &str),
        C: Fn() -> bool,
    {
        if self.busy.swap(true, Ordering::SeqCst) {
            info!("run request dropped: executor busy");
            return Ok(RunOutcome::Busy);
        }
        self.set_state(RunState::Running);
        let mut ctx = ctx;
        let result = self.run_stages(&mut ctx, &mut progress, &is_cancelled);
        let outcome = match result {
            Ok(()) => {
                self.set_state(RunState::Completed);
                Ok(RunOutcome::Completed(Box::new(ctx)))
            }
            Err(err) => match err.downcast_ref::<Error>() {
                Some(e) if e.is_cancelled() => {
                    self.set_state(RunState::Cancelled);
                    info!("analysis cancelled at stage boundary");
                    Ok(RunOutcome::Cancelled)
                }
                _ => {
                    self.set_state(RunState::Failed);
                    Err(err)
                }
            },
        };
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    pub fn spawn<P, C>(
        self: Arc<Self>,
        ctx: Ctx,
        progress: P,
        is_cancelled: C,
    ) -> JoinHandle<Result<RunOutcome>>
    where
        P: FnMut(u8, &str) + Send + 'static,
        C: Fn() -> bool + Send + 'static,
    {
        thread::spawn(move || self.run(ctx, progress, is_cancelled))
    }

    fn run_stages<P, C>(&self, ctx: &mut Ctx, progress: &mut P, is_cancelled: &C) -> Result<()>
    where
        P: FnMut(u8, &str),
        C: Fn() -> bool,
    {
        progress(0, "analysis_started");
        let total = self.stages.len();
        for (idx, stage) in self.stages.iter().enumerate() {
            checkpoint(is_cancelled)?;
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
            // a cancel observed here drops the finished stage's percent
            checkpoint(is_cancelled)?;
            let percent = (((idx + 1) * 100) / total) as u8;
            progress(percent, stage.name());
        }
        Ok(())
    }

    fn set_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

fn checkpoint<C: Fn() -> bool>(is_cancelled: &C) -> Result<()> {
    if is_cancelled() {
        return Err(Error::Cancelled.into());
    }
    Ok(())
}

pub(crate) fn ensure_plate(
    plate: &Plate,
    stage: &'static str,
    column: &'static str,
) -> Result<()> {
    if !plate.is_complete() {
        return Err(Error::MissingColumn { stage, column }.into());
    }
    Ok(())
}
