use approx_eq::assert_approx_eq;

use super::*;

fn engine_at(sample_rate: f64) -> DescriptorEngine<f64> {
    let mut engine = DescriptorEngine::new();
    engine.set_sample_rate(sample_rate).unwrap();
    engine
}

#[test]
fn rejected_updates_leave_state_alone() {
    let mut engine = engine_at(800.0);
    engine.set_buffer(&[0.1, 0.2]).unwrap();
    engine.set_magnitudes(&[0.0, 1.0, 0.0], true).unwrap();

    assert!(matches!(
        engine.set_sample_rate(0.0),
        Err(DescriptorError::InvalidSampleRate(_))
    ));
    assert!(engine.set_sample_rate(f64::INFINITY).is_err());
    assert!(engine.set_rolloff_point(0.0).is_err());
    assert!(engine.set_rolloff_point(1.0).is_err());
    assert!(engine.set_stft_size(2).is_err());
    assert!(engine.set_buffer(&[]).is_err());
    assert!(engine.set_magnitudes(&[], false).is_err());
    assert!(matches!(
        engine.set_previous_magnitudes(&[1.0]),
        Err(DescriptorError::PreviousLengthMismatch { expected: 3, found: 1 })
    ));

    assert_eq!(engine.sample_rate(), 800.0);
    assert_eq!(engine.rolloff_point(), 0.85);
    assert_eq!(engine.stft_size(), 4);
    assert_eq!(engine.buffer(), &[0.1, 0.2]);
    assert_eq!(engine.magnitudes(), &[0.0, 1.0, 0.0]);
}

#[test]
fn first_spectrum_gets_zeroed_previous() {
    let mut engine = engine_at(800.0);
    engine.set_magnitudes(&[0.5, 0.25, 0.125], false).unwrap();
    assert_eq!(engine.previous_magnitudes(), &[0.0, 0.0, 0.0]);

    engine.set_magnitudes(&[1.0, 2.0, 3.0], false).unwrap();
    assert_eq!(engine.previous_magnitudes(), &[0.5, 0.25, 0.125]);
    assert_eq!(engine.magnitudes(), &[1.0, 2.0, 3.0]);
}

#[test]
fn flux_compares_against_previous_spectrum() {
    let mut engine = engine_at(800.0);
    engine.set_magnitudes(&[1.0, 0.0, 0.0, 0.0], true).unwrap();
    engine.compute_descriptors(false, true);
    // sqrt(1) / 4 against the zeroed previous spectrum.
    assert_approx_eq!(engine.get_frequency_descriptor("flux"), 0.25, 1e-12);

    engine.set_magnitudes(&[1.0, 0.0, 0.0, 0.0], true).unwrap();
    engine.compute_descriptors(false, true);
    assert_eq!(engine.get_frequency_descriptor("flux"), 0.0);

    engine.set_previous_magnitudes(&[0.0, 0.0, 0.0, 2.0]).unwrap();
    engine.compute_descriptors(false, true);
    assert_approx_eq!(
        engine.get_frequency_descriptor("flux"),
        5.0_f64.sqrt() / 4.0,
        1e-12
    );
}

#[test]
fn groups_are_gated_independently() {
    let mut engine = engine_at(800.0);
    engine.compute_descriptors(true, true);
    assert!(engine.time_descriptors().is_empty());
    assert!(engine.frequency_descriptors().is_empty());

    engine.set_magnitudes(&[1.0, 1.0], true).unwrap();
    engine.compute_descriptors(true, true);
    assert!(!engine.has_spectrum());
    assert!(engine.frequency_descriptors().is_empty());
    assert_eq!(engine.stft_size(), 4096);

    engine.set_buffer(&[0.5, -0.25]).unwrap();
    engine.compute_descriptors(false, true);
    assert!(engine.time_descriptors().is_empty());
    engine.compute_descriptors(true, false);
    assert_eq!(engine.time_descriptors().len(), TimeDescriptor::ALL.len());
    assert_eq!(engine.get_time_descriptor("peak"), 0.5);
}

#[test]
fn fills_every_canonical_name() {
    let mut engine = engine_at(44_100.0);
    engine
        .set_buffer(&[0.3, -0.1, 0.8, -0.6, 0.2, 0.0, -0.4])
        .unwrap();
    engine
        .set_magnitudes(&[0.1, 0.8, 0.4, 0.3, 0.05, 0.2, 0.0, 0.1, 0.02], true)
        .unwrap();
    engine.compute_descriptors(true, true);

    for name in ["peak", "rms", "variance", "kurtosis", "skewness", "zerocrossing"] {
        assert!(engine.time_descriptors().contains(name.parse().unwrap()));
        assert!(engine.get_time_descriptor(name).is_finite());
    }
    for descriptor in FrequencyDescriptor::ALL {
        assert!(engine.frequency_descriptors().contains(*descriptor));
        assert!(engine.get_frequency_descriptor(descriptor.name()).is_finite());
    }
}

#[test]
fn compute_is_idempotent() {
    let mut engine = engine_at(48_000.0);
    engine.set_buffer(&[0.1, 0.4, -0.3, 0.9, -0.7]).unwrap();
    engine
        .set_magnitudes(&[0.2, 0.6, 0.9, 0.1, 0.4], true)
        .unwrap();

    engine.compute_descriptors(true, true);
    let first = engine.snapshot();
    engine.compute_descriptors(true, true);
    assert_eq!(engine.snapshot(), first);
}

#[test]
fn pipeline_matches_standalone_functions() {
    let magnitudes = [0.3, 0.7, 0.1, 0.9, 0.05, 0.4, 0.2, 0.6, 0.0];
    let mut engine = engine_at(16_000.0);
    engine.set_magnitudes(&magnitudes, true).unwrap();
    engine.set_rolloff_point(0.5).unwrap();
    engine.compute_descriptors(false, true);

    let sr = 16_000.0;
    let expectations = [
        ("centroid", frequency::centroid(&magnitudes, sr, None)),
        ("spread", frequency::spread(&magnitudes, sr, None, None)),
        ("kurtosis", frequency::kurtosis(&magnitudes, sr, None, None, None)),
        ("skewness", frequency::skewness(&magnitudes, sr, None, None, None)),
        ("rolloff", frequency::rolloff(&magnitudes, sr, 0.5, None)),
        ("slope", frequency::slope(&magnitudes, sr, None)),
    ];
    for (name, expected) in expectations {
        assert_approx_eq!(engine.get_frequency_descriptor(name), expected, 1e-9);
    }
}

#[test]
fn single_descriptor_helpers_store_results() {
    let mut engine = engine_at(800.0);
    assert_eq!(engine.compute_time_descriptor(TimeDescriptor::Rms), 0.0);
    assert!(engine.time_descriptors().is_empty());

    engine.set_buffer(&[1.0, -1.0, 1.0, -1.0]).unwrap();
    assert_approx_eq!(engine.compute_time_descriptor(TimeDescriptor::Rms), 1.0, 1e-12);
    assert_approx_eq!(engine.get_time_descriptor("rms"), 1.0, 1e-12);

    engine.set_magnitudes(&[0.0, 0.0, 1.0, 0.0, 1.0], true).unwrap();
    let spread = engine.compute_frequency_descriptor(FrequencyDescriptor::Spread);
    assert_approx_eq!(spread, 100.0, 1e-12);
    assert_eq!(engine.frequency_descriptors().len(), 1);

    engine.clear_descriptors();
    assert!(engine.time_descriptors().is_empty());
    assert!(engine.frequency_descriptors().is_empty());
}

#[test]
fn frequency_table_tracks_rate_and_size() {
    let mut engine = engine_at(800.0);
    engine.set_magnitudes(&[1.0; 5], true).unwrap();
    assert_eq!(engine.frequencies()[..5], [0.0, 100.0, 200.0, 300.0, 400.0]);

    engine.set_sample_rate(1600.0).unwrap();
    assert_eq!(engine.frequencies()[4], 800.0);

    engine.set_stft_size(16).unwrap();
    assert_eq!(engine.frequencies().len(), 9);
    assert_eq!(engine.frequencies()[1], 100.0);

    engine.set_stft_size(4).unwrap();
    assert!(engine.frequencies().len() >= engine.magnitudes().len());
}

#[test]
fn transform_and_direct_magnitudes_store_the_same_array() {
    // Packed 8-point transform: DC, Nyquist, then (re, im) pairs.
    let packed = [4.0, -1.0, 0.5, 0.5, 0.0, -2.0, 3.0, 4.0];

    let mut from_stft = engine_at(800.0);
    from_stft
        .set_magnitudes_from_stft(&packed, TransformLayout::Packed)
        .unwrap();

    let expected = transform::magnitudes(&packed, TransformLayout::Packed).unwrap();
    let mut direct = engine_at(800.0);
    direct.set_magnitudes(&expected, true).unwrap();

    assert_eq!(from_stft.magnitudes(), direct.magnitudes());
    assert_eq!(from_stft.stft_size(), 8);
    assert_eq!(direct.stft_size(), 8);
    assert_eq!(from_stft.magnitudes()[3], 5.0);

    assert!(from_stft
        .set_magnitudes_from_stft(&[1.0, 2.0], TransformLayout::Packed)
        .is_err());
    assert_eq!(from_stft.magnitudes(), direct.magnitudes());
}

#[test]
fn unknown_names_read_as_zero() {
    let mut engine = engine_at(800.0);
    engine.set_buffer(&[0.2, 0.4]).unwrap();
    engine.compute_descriptors(true, true);
    assert_eq!(engine.get_time_descriptor("nonexistent"), 0.0);
    assert_eq!(engine.get_frequency_descriptor("nonexistent"), 0.0);
}

#[test]
fn snapshot_outlives_later_updates() {
    let mut engine = engine_at(800.0);
    engine.set_buffer(&[0.5, 0.5]).unwrap();
    engine.compute_descriptors(true, false);
    let snapshot = engine.snapshot();

    engine.set_buffer(&[0.9, 0.9]).unwrap();
    engine.compute_descriptors(true, false);

    let handle = std::thread::spawn(move || snapshot.time_descriptor("peak"));
    assert_eq!(handle.join().unwrap(), 0.5);
    assert_eq!(engine.get_time_descriptor("peak"), 0.9);
}

#[test]
fn degenerate_inputs_read_as_zero_through_the_pipeline() {
    let mut engine = engine_at(44_100.0);
    engine.set_buffer(&[0.1; 10]).unwrap();
    let mut magnitudes = vec![0.0; 513];
    magnitudes[11] = 0.7;
    engine.set_magnitudes(&magnitudes, true).unwrap();
    engine.compute_descriptors(true, true);

    assert_eq!(engine.get_time_descriptor("kurtosis"), 0.0);
    assert_eq!(engine.get_time_descriptor("skewness"), 0.0);
    assert_eq!(engine.get_frequency_descriptor("spread"), 0.0);
    assert_eq!(engine.get_frequency_descriptor("kurtosis"), 0.0);
    assert_eq!(engine.get_frequency_descriptor("skewness"), 0.0);
    assert_approx_eq!(
        engine.get_frequency_descriptor("centroid"),
        11.0 * 44_100.0 / 1024.0,
        1e-9
    );
}

#[test]
fn odd_interleaved_transform_keeps_its_size() {
    // Nine complex bins; only 0..=4 are kept.
    let mut interleaved = vec![0.0; 18];
    interleaved[6] = 3.0;
    interleaved[7] = 4.0;

    let mut engine = engine_at(900.0);
    engine
        .set_magnitudes_from_stft(&interleaved, TransformLayout::Interleaved)
        .unwrap();

    assert_eq!(engine.stft_size(), 9);
    assert_eq!(engine.magnitudes(), &[0.0, 0.0, 0.0, 5.0, 0.0]);
    engine.compute_descriptors(false, true);
    assert_approx_eq!(engine.get_frequency_descriptor("peak"), 300.0, 1e-9);
}
