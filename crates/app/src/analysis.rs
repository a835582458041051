use std::{fmt, sync::Arc};

use audio_descriptors_core::{
    transform::magnitudes_from_complex, window, AnalysisConfig, DescriptorEngine, DescriptorError,
    DescriptorSnapshot, EngineConfig, Result, WindowKind,
};
use realfft::{num_complex::Complex64, RealFftPlanner, RealToComplex};
use serde::Serialize;

/// Descriptors of one analysed frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub index: usize,
    /// Start of the frame in seconds.
    pub time_seconds: f64,
    #[serde(flatten)]
    pub descriptors: DescriptorSnapshot<f64>,
}

/// Splits a signal into overlapping frames and runs the descriptor engine
/// over each of them.
///
/// Every frame goes through the engine twice: the raw samples as the time
/// domain buffer and the magnitudes of the windowed forward transform as the
/// spectrum. The last partial frame is zero padded for the transform only;
/// its time domain descriptors see just the samples it actually holds. The
/// transform size stays at `frame_size`, odd sizes included.
pub struct FrameAnalyzer {
    config: AnalysisConfig,
    engine: DescriptorEngine<f64>,
    fft_planner: RealFftPlanner<f64>,
    fft: Option<FftResources>,
}

impl FrameAnalyzer {
    pub fn new(engine: &EngineConfig, analysis: AnalysisConfig) -> Result<Self> {
        analysis.validate()?;
        let engine = DescriptorEngine::with_config(&EngineConfig {
            stft_size: analysis.frame_size,
            ..engine.clone()
        })?;

        Ok(Self {
            config: analysis,
            engine,
            fft_planner: RealFftPlanner::new(),
            fft: None,
        })
    }

    /// Analyses `samples` frame by frame.
    pub fn analyze(&mut self, samples: &[f64]) -> Result<Vec<FrameReport>> {
        let frame_size = self.config.frame_size;
        let hop_size = self.config.hop_size;
        let mut frame = vec![0.0; frame_size];
        let mut reports = Vec::with_capacity(samples.len() / hop_size + 1);

        let mut start = 0;
        while start < samples.len() {
            let end = (start + frame_size).min(samples.len());
            let filled = end - start;
            frame[..filled].copy_from_slice(&samples[start..end]);
            frame[filled..].fill(0.0);

            reports.push(self.process_frame(reports.len(), start, &frame, filled)?);

            if end == samples.len() {
                break;
            }
            start += hop_size;
        }

        tracing::debug!(frames = reports.len(), "analysed signal");
        Ok(reports)
    }

    fn process_frame(
        &mut self,
        index: usize,
        start: usize,
        frame: &[f64],
        filled: usize,
    ) -> Result<FrameReport> {
        let magnitudes = self.compute_magnitudes(frame)?;

        self.engine.set_buffer(&frame[..filled])?;
        self.engine.set_magnitudes(&magnitudes, false)?;
        self.engine.compute_descriptors(true, true);

        Ok(FrameReport {
            index,
            time_seconds: start as f64 / self.engine.sample_rate(),
            descriptors: self.engine.snapshot(),
        })
    }

    fn compute_magnitudes(&mut self, frame: &[f64]) -> Result<Vec<f64>> {
        let fft = self.prepare_fft(frame.len());

        for ((input, sample), coefficient) in fft.input.iter_mut().zip(frame).zip(&fft.window) {
            *input = sample * coefficient;
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)
            .map_err(|err| DescriptorError::msg(format!("forward transform failed: {err}")))?;

        Ok(magnitudes_from_complex(&fft.spectrum))
    }

    fn prepare_fft(&mut self, size: usize) -> &mut FftResources {
        let rebuild = self
            .fft
            .as_ref()
            .map(|fft| fft.size != size)
            .unwrap_or(true);
        if rebuild {
            self.fft = None;
        }

        let planner = &mut self.fft_planner;
        let kind = self.config.window;
        self.fft
            .get_or_insert_with(|| FftResources::new(planner, size, kind))
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f64>>,
    window: Vec<f64>,
    scratch: Vec<Complex64>,
    spectrum: Vec<Complex64>,
    input: Vec<f64>,
}

impl FftResources {
    fn new(planner: &mut RealFftPlanner<f64>, size: usize, kind: WindowKind) -> Self {
        let plan = planner.plan_fft_forward(size);
        Self {
            size,
            window: window::coefficients(kind, size),
            scratch: plan.make_scratch_vec(),
            spectrum: plan.make_output_vec(),
            input: plan.make_input_vec(),
            plan,
        }
    }
}

impl fmt::Debug for FrameAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameAnalyzer")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("fft", &self.fft)
            .finish()
    }
}

impl fmt::Debug for FftResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftResources")
            .field("size", &self.size)
            .finish()
    }
}
