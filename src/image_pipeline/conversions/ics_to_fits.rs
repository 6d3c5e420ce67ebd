use std::path::Path;

use tracing::{Dispatch, debug, info, instrument, warn};

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    conversions::{ConversionConfig, PipelineTimings},
    destination::{DestinationImage, DestinationWriter},
    fits::FitsWriter,
    ics::{IcsReader, SourceHandle, SourceReader},
    layout::{AxisPlan, DatatypeRegistry, ElementKind, ImageDescriptor, deinterleave},
};

/// Converts channel-interleaved source images into channel-last planar
/// destination images.
///
/// Holds no per-conversion state: `convert` takes `&self` and every buffer
/// lives only for the duration of one call.
pub struct ConversionPipeline<R: SourceReader, W: DestinationWriter> {
    reader: R,
    writer: W,
    registry: DatatypeRegistry,
    config: ConversionConfig,
    diagnostics: Option<Dispatch>,
}

impl ConversionPipeline<IcsReader, FitsWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(IcsReader, FitsWriter, config)
    }
}

impl<R: SourceReader, W: DestinationWriter> ConversionPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            registry: DatatypeRegistry::standard(),
            config,
            diagnostics: None,
        }
    }

    /// Replaces the datatype registry (the standard one supports `Uint16` only).
    pub fn with_registry(mut self, registry: DatatypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Routes the pipeline's diagnostics to `dispatch` instead of the
    /// ambient default subscriber.
    pub fn with_diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = Some(dispatch);
        self
    }

    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(&self, source: P, destination: Q) -> Result<()> {
        self.convert_with_timings(source, destination).map(|_| ())
    }

    pub fn convert_with_timings<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<PipelineTimings> {
        let (source, destination) = (source.as_ref(), destination.as_ref());
        match &self.diagnostics {
            Some(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || self.run(source, destination))
            }
            None => self.run(source, destination),
        }
    }

    #[instrument(skip_all, fields(source = %source.display(), destination = %destination.display()))]
    fn run(&self, source: &Path, destination: &Path) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();

        info!(path = %source.display(), "Reading file");
        let mut handle = timings.measure("open_source", || self.reader.open(source))?;

        let outcome = timings
            .measure("read_source", || self.read_descriptor(&mut handle))
            .and_then(|(descriptor, kind)| {
                self.convert_descriptor(descriptor, kind, destination, &mut timings)
            });

        // The outcome is already decided; a failing close only gets reported.
        if let Err(e) = handle.close() {
            let warning = match e {
                ConversionError::CloseWarning(reason) => reason,
                other => other.to_string(),
            };
            warn!(path = %source.display(), reason = %warning, "Could not close source");
        }

        outcome?;
        info!(
            total_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "Conversion complete"
        );
        Ok(timings)
    }

    /// Reads the source once its datatype is known to be supported.
    fn read_descriptor(&self, handle: &mut R::Handle) -> Result<(ImageDescriptor, ElementKind)> {
        let layout = handle.layout();
        let size = handle.data_size();

        debug!(
            rank = layout.extents.len(),
            extents = ?layout.extents,
            datatype = %layout.datatype,
            bytes = size,
            "Source layout"
        );

        let kind = self.registry.element_kind(&layout.datatype)?;

        if self.config.validate_layout {
            let expected = layout
                .extents
                .iter()
                .try_fold(kind.size, |acc, &extent| acc.checked_mul(extent));
            if expected != Some(size) {
                return Err(ConversionError::ShapeMismatchError(format!(
                    "source reports {} bytes of data but extents {:?} of {} need {}",
                    size,
                    layout.extents,
                    layout.datatype,
                    expected.map_or_else(|| "more than addressable".to_string(), |n| n.to_string())
                )));
            }
        }

        let mut data = Vec::new();
        data.try_reserve_exact(size).map_err(|e| {
            ConversionError::SourceReadError(format!("cannot allocate {} bytes: {}", size, e))
        })?;
        data.resize(size, 0);
        handle.read_data(&mut data)?;

        let descriptor = ImageDescriptor {
            extents: layout.extents,
            datatype: layout.datatype,
            data,
        };
        Ok((descriptor, kind))
    }

    fn convert_descriptor(
        &self,
        descriptor: ImageDescriptor,
        kind: ElementKind,
        destination: &Path,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        descriptor.validate(kind.size)?;

        let plan = timings.measure("plan_axes", || AxisPlan::from_source_extents(&descriptor.extents))?;
        debug!(
            naxes = ?plan.extents(),
            channels = plan.channel_count(),
            elements = plan.element_count(),
            "Planned destination axes"
        );

        let planar = timings.measure("transform", || {
            deinterleave(&descriptor.data, kind.size, plan.channel_count())
        })?;
        drop(descriptor);

        info!(path = %destination.display(), "Saving file");
        timings.measure("write_destination", || {
            self.write_destination(destination, &plan, kind, &planar)
        })
    }

    fn write_destination(
        &self,
        destination: &Path,
        plan: &AxisPlan,
        kind: ElementKind,
        planar: &[u8],
    ) -> Result<()> {
        if !self.config.overwrite && destination.exists() {
            return Err(ConversionError::DestinationCreateError(format!(
                "'{}' already exists",
                destination.display()
            )));
        }

        let mut image = self.writer.create_image(destination, plan.extents(), kind)?;
        image.write_image(planar, plan.element_count())?;
        if self.config.overwrite {
            image.finalize()
        } else {
            // The rename re-checks the path
            image.finalize_no_clobber()
        }
    }

    pub fn registry(&self) -> &DatatypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
