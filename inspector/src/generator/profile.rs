use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vametacore::metadata::{
    Appearance, Behaviour, ClassCandidate, DisplayColor, Frame, NavigationalData, OnvifClass,
    OnvifObject, Rectangle, Shape, Vector, VideoAnalytics,
};
use vametacore::MetadataStream;

/// Configuration for generating synthetic metadata streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub frames: usize,
    pub objects_per_frame: usize,
    pub seed: u64,
    pub frame_interval_ms: i64,
    pub start_time: DateTime<Utc>,
    pub class_labels: Vec<String>,
    pub include_navigation: bool,
    pub original_data_bytes: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            frames: 25,
            objects_per_frame: 4,
            seed: 0,
            frame_interval_ms: 40,
            start_time: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            class_labels: vec!["Human".into(), "Vehicle".into(), "Animal".into()],
            include_navigation: true,
            original_data_bytes: 0,
        }
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading generator config {}", path_ref.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing generator config {}", path_ref.display()))
    }
}

// Two decimals keep generated documents readable.
fn coarse(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn build_object(rng: &mut StdRng, object_id: i32, labels: &[String]) -> OnvifObject {
    let width = coarse(rng.gen_range(0.05..0.3));
    let height = coarse(rng.gen_range(0.05..0.3));
    let left = coarse(rng.gen_range(-1.0..0.7));
    let top = coarse(rng.gen_range(-1.0..0.7));
    let mut bounding_box = Rectangle::new(top, top + height, left, left + width);
    if rng.gen_bool(0.25) {
        bounding_box.line_color = Some(DisplayColor::from_rgb(rng.gen(), rng.gen(), rng.gen()));
        bounding_box.line_thickness = Some(rng.gen_range(1..4));
    }
    let center = Vector::new(
        bounding_box.left + bounding_box.width() / 2.0,
        bounding_box.top + bounding_box.height() / 2.0,
    );

    let class = (!labels.is_empty()).then(|| {
        let primary = rng.gen_range(0..labels.len());
        let likelihood = coarse(rng.gen_range(0.5..1.0));
        let mut candidates = vec![ClassCandidate::new(labels[primary].clone(), likelihood)];
        if labels.len() > 1 {
            let secondary = (primary + 1) % labels.len();
            let remainder = coarse(1.0 - likelihood).max(0.01);
            candidates.push(ClassCandidate::new(labels[secondary].clone(), remainder));
        }
        OnvifClass::new(candidates)
    });

    let behaviour = Behaviour {
        is_idle: rng.gen_bool(0.1),
        is_removed: false,
    };

    OnvifObject {
        object_id,
        appearance: Some(Appearance {
            transformation: None,
            shape: Some(Shape {
                bounding_box: Some(bounding_box),
                center_of_gravity: Some(center),
            }),
            class,
            description: None,
        }),
        behaviour: behaviour.has_behaviours().then_some(behaviour),
    }
}

fn build_navigation(rng: &mut StdRng) -> anyhow::Result<NavigationalData> {
    let mut navigation = NavigationalData::default();
    navigation.set_altitude(Some(coarse(rng.gen_range(0.0..500.0))));
    navigation.set_latitude(Some(coarse(rng.gen_range(-90.0..=90.0))))?;
    navigation.set_longitude(Some(coarse(rng.gen_range(-180.0..=180.0))))?;
    navigation.set_azimuth(Some(coarse(rng.gen_range(-180.0..=180.0))))?;
    navigation.set_speed(Some(coarse(rng.gen_range(0.0..30.0))))?;
    navigation.set_horizontal_accuracy(Some(coarse(rng.gen_range(0.5..10.0))))?;
    navigation.set_geodetic_system(Some("WGS84".to_string()));
    Ok(navigation)
}

pub fn build_metadata_stream(config: &GeneratorConfig) -> anyhow::Result<MetadataStream> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let object_count = i32::try_from(config.objects_per_frame)
        .context("objects_per_frame does not fit an object id")?;

    let mut frames = Vec::with_capacity(config.frames);
    for frame_index in 0..config.frames {
        let offset = i64::try_from(frame_index)
            .ok()
            .and_then(|index| index.checked_mul(config.frame_interval_ms))
            .context("overflow computing frame timestamp")?;
        let mut frame = Frame::new(config.start_time + Duration::milliseconds(offset));
        for object_id in 1..=object_count {
            frame
                .objects
                .push(build_object(&mut rng, object_id, &config.class_labels));
        }
        frames.push(frame);
    }

    let mut stream = MetadataStream::new(vec![VideoAnalytics::new(frames)]);
    if config.include_navigation {
        stream.navigational_data = Some(build_navigation(&mut rng)?);
    }
    stream.original_data = (0..config.original_data_bytes).map(|_| rng.gen()).collect();
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_object_count() {
        let stream = build_metadata_stream(&GeneratorConfig::default()).unwrap();
        assert_eq!(stream.frames().count(), 25);
        assert!(stream.frames().all(|frame| frame.objects().len() == 4));
        assert!(stream.navigational_data.is_some());
        assert!(stream.original_data.is_empty());
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            frames: 3,
            objects_per_frame: 2,
            seed: 13,
            frame_interval_ms: 500,
            class_labels: vec!["Face".into()],
            include_navigation: false,
            original_data_bytes: 8,
            ..Default::default()
        };

        let first = build_metadata_stream(&config).unwrap();
        let second = build_metadata_stream(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.original_data.len(), 8);
        let times: Vec<_> = first.frames().map(|frame| frame.utc_time).collect();
        assert_eq!(times[2] - times[0], Duration::seconds(1));
        for object in first.frames().flat_map(|frame| frame.objects()) {
            let class = object.appearance.as_ref().unwrap().class.as_ref().unwrap();
            assert_eq!(class.candidates.len(), 1);
            assert!(class.candidates[0].is_valid());
        }
    }

    #[test]
    fn generator_config_reads_partial_yaml() {
        let config: GeneratorConfig =
            serde_yaml::from_str("frames: 2\nseed: 7\nstart_time: 2024-06-01T12:00:00Z\n").unwrap();
        assert_eq!(config.frames, 2);
        assert_eq!(config.objects_per_frame, 4);
        let stream = build_metadata_stream(&config).unwrap();
        assert_eq!(
            stream.first_frame().unwrap().utc_time,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );
    }
}
