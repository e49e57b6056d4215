use crate::config::PipelineConfig;
use crate::encode::sink::{SinkConfig, VideoSink};
use crate::event::GameEvent;
use crate::fingerprint::{StreamFingerprint, StreamHasher};
use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::palette::{PaletteTracker, Side};
use crate::render::FrameRenderer;
use crate::render::frame::Frame;
use crate::render::symbol::SymbolEncoder;
use crate::tier::{EcTier, text_len};

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunStats {
    /// Frames written (always equal to the number of events).
    pub frames: u64,
    /// Frames per tier, indexed `L, M, Q, H`.
    pub tier_counts: [u64; 4],
    /// Transition events seen.
    pub transitions: u64,
    /// Fingerprint of every written frame, in order.
    pub fingerprint: StreamFingerprint,
}

impl RunStats {
    pub fn tier_count(&self, tier: EcTier) -> u64 {
        self.tier_counts[tier.slot()]
    }
}

/// Drives events through palette tracking, tier selection, rendering, and the sink.
#[derive(Debug)]
pub struct Pipeline {
    cfg: PipelineConfig,
    renderer: FrameRenderer,
}

impl Pipeline {
    /// Validate `cfg` and build the renderer (including the tier capacity check).
    pub fn new(cfg: PipelineConfig) -> QrfeedResult<Self> {
        let renderer = FrameRenderer::new(&cfg)?;
        Ok(Self { cfg, renderer })
    }

    pub fn with_encoder(
        cfg: PipelineConfig,
        encoder: Box<dyn SymbolEncoder>,
    ) -> QrfeedResult<Self> {
        let renderer = FrameRenderer::with_encoder(&cfg, encoder)?;
        Ok(Self { cfg, renderer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    fn tracker<'a>(&self, side_a: &'a Side, side_b: &'a Side) -> PaletteTracker<'a> {
        PaletteTracker::new(
            side_a,
            side_b,
            self.cfg.palette.initial_active,
            self.cfg.palette.transition_event_type,
        )
    }

    fn render_event(
        &self,
        event: &GameEvent,
        tracker: &mut PaletteTracker<'_>,
    ) -> QrfeedResult<(EcTier, Frame)> {
        let palette = tracker.on_event(event);
        let tier = self.cfg.tiers.select(text_len(&event.description))?;
        let frame = self.renderer.render(&event.description, tier, palette)?;
        Ok((tier, frame))
    }

    /// Render every event, in order, into `sink` and close it.
    ///
    /// Fails on the first error; the sink is left unclosed in that case and the error names
    /// the offending event.
    #[tracing::instrument(skip_all, fields(events = events.len()))]
    pub fn run(
        &self,
        events: &[GameEvent],
        side_a: &Side,
        side_b: &Side,
        sink: &mut dyn VideoSink,
    ) -> QrfeedResult<RunStats> {
        let mut tracker = self.tracker(side_a, side_b);
        let mut hasher = StreamHasher::new();
        let mut tier_counts = [0u64; 4];
        let progress_every = (events.len() / 10).max(1);

        tracing::info!(
            side_a = %side_a.name,
            side_b = %side_b.name,
            initially_active = %tracker.active().name,
            "rendering {} events",
            events.len()
        );
        sink.open(SinkConfig::from_pipeline(&self.cfg))?;

        for (index, event) in events.iter().enumerate() {
            let (tier, frame) = self
                .render_event(event, &mut tracker)
                .map_err(|e| e.at_event(index, &event.description))?;
            let written = sink
                .write(&frame)
                .map_err(|e| e.at_event(index, &event.description))?;
            if written.0 != index as u64 {
                return Err(QrfeedError::validation(format!(
                    "sink placed frame at {}, expected {index}",
                    written.0
                ))
                .at_event(index, &event.description));
            }

            hasher.write_frame(&frame);
            tier_counts[tier.slot()] += 1;
            tracing::debug!(
                index,
                kind = event.kind,
                len = text_len(&event.description),
                ?tier,
                active = %tracker.active().name,
                "frame"
            );
            if (index + 1) % progress_every == 0 {
                tracing::info!("{}/{} frames", index + 1, events.len());
            }
        }

        sink.close()?;

        let stats = RunStats {
            frames: events.len() as u64,
            tier_counts,
            transitions: tracker.transitions(),
            fingerprint: hasher.finish(),
        };
        tracing::info!(
            frames = stats.frames,
            transitions = stats.transitions,
            l = stats.tier_count(EcTier::L),
            m = stats.tier_count(EcTier::M),
            q = stats.tier_count(EcTier::Q),
            h = stats.tier_count(EcTier::H),
            fingerprint = %stats.fingerprint,
            "run complete"
        );
        Ok(stats)
    }

    /// Render the frame for `events[index]` with the palette it has during a full run.
    pub fn render_single(
        &self,
        events: &[GameEvent],
        index: usize,
        side_a: &Side,
        side_b: &Side,
    ) -> QrfeedResult<(EcTier, Frame)> {
        let Some(event) = events.get(index) else {
            return Err(QrfeedError::validation(format!(
                "event index {index} out of range (feed has {} events)",
                events.len()
            )));
        };
        let mut tracker = self.tracker(side_a, side_b);
        for earlier in &events[..index] {
            tracker.on_event(earlier);
        }
        self.render_event(event, &mut tracker)
            .map_err(|e| e.at_event(index, &event.description))
    }
}
