/// End-to-end rendering: tune text in, WAV file out, verified by reading
/// the file back with hound.
use picotune::{RenderConfig, Renderer, SampleFormat, SAMPLE_RATE};
use std::path::PathBuf;

const SONG: &str = "
tune testsong
sequence verse verse chorus

instrument lead
  tone square
  volume half
  pan centerleft
  reverb some

instrument bass
  tone triangle
  length half

instrument hats
  tone noise
  volume quarter
  pan right

pattern riff C4E4G4-
pattern low C2.C2.
pattern tick C6C6C6C6
pattern hush ....

phrase verse
  tempo 120
  beats 2
  subbeats 2
  melodies
    lead riff
    bass low
    hats tick

phrase chorus
  tempo 240
  beats 4
  subbeats 1
  melodies
    lead hush
";

fn renderer(format: SampleFormat, seed: u64) -> Renderer {
    Renderer::new(RenderConfig {
        format,
        output_dir: None,
        seed: Some(seed),
    })
}

#[test]
fn test_render_pcm16_file() {
    let tune = picotune::load(SONG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.wav");

    let stats = renderer(SampleFormat::Pcm16, 1)
        .render_to_file(&tune, &path)
        .unwrap();

    // verse: 60/120 * 2 beats = 1s, chorus: 60/240 * 4 beats = 1s
    assert_eq!(stats.frame_count, 3 * SAMPLE_RATE as usize);
    assert!((stats.duration - 3.0).abs() < 1e-9);
    assert!(stats.peak_left > 0.0);
    assert!(stats.peak_right > 0.0);

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len() as usize, 2 * stats.frame_count);
}

#[test]
fn test_render_pcm8_is_default_format() {
    let tune = picotune::load(SONG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.wav");

    Renderer::new(RenderConfig::default())
        .render_to_file(&tune, &path)
        .unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 8);

    let samples: Vec<i8> = reader.samples::<i8>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 2 * 3 * SAMPLE_RATE as usize);
    assert!(samples.iter().any(|&s| s != 0));
}

#[test]
fn test_silent_phrase_writes_silence() {
    let tune = picotune::load(SONG).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.wav");

    renderer(SampleFormat::Float32, 5)
        .render_to_file(&tune, &path)
        .unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();

    // The chorus only plays rests. The verse's reverb tail stays inside the
    // verse buffer, so the final second is exact silence.
    let chorus_start = 2 * 2 * SAMPLE_RATE as usize;
    assert!(samples[chorus_start..].iter().all(|&s| s == 0.0));
    assert!(samples[..chorus_start].iter().any(|&s| s != 0.0));
}

#[test]
fn test_same_seed_same_audio() {
    let tune = picotune::load(SONG).unwrap();

    let first = renderer(SampleFormat::Pcm8, 42).render_tune(&tune).unwrap();
    let second = renderer(SampleFormat::Pcm8, 42).render_tune(&tune).unwrap();
    let other = renderer(SampleFormat::Pcm8, 43).render_tune(&tune).unwrap();

    assert_eq!(first.buffer(), second.buffer());
    // Only the noise instrument depends on the seed
    assert_ne!(first.buffer(), other.buffer());
}

#[test]
fn test_repeated_phrase_is_identical() {
    let tune = picotune::load(SONG).unwrap();
    let rendered = renderer(SampleFormat::Pcm8, 9).render_tune(&tune).unwrap();

    let verse = rendered.phrase_buffer("verse").unwrap();
    let buffer = rendered.buffer();
    assert_eq!(&buffer[..verse.len()], verse);
    assert_eq!(&buffer[verse.len()..2 * verse.len()], verse);
}

#[test]
fn test_hard_left_leaves_right_channel_silent() {
    let source = "
        tune left
        sequence a
        instrument lead
          tone saw
          pan left
        pattern p C3D3E3F3
        phrase a
          tempo 60
          beats 1
          subbeats 4
          melodies
            lead p
    ";
    let tune = picotune::load(source).unwrap();
    let rendered = renderer(SampleFormat::Float32, 0).render_tune(&tune).unwrap();

    assert!(rendered.buffer().iter().all(|s| s.right == 0.0));
    assert!(rendered.buffer().iter().any(|s| s.left != 0.0));
}

#[test]
fn test_output_path_from_config() {
    let tune = picotune::load(SONG).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let renderer = Renderer::new(RenderConfig {
        format: SampleFormat::Pcm8,
        output_dir: Some(dir.path().to_path_buf()),
        seed: Some(3),
    });
    let path = renderer.output_path(&tune);
    assert_eq!(path, dir.path().join("testsong.wav"));

    renderer.render_to_file(&tune, &path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("song.tune");
    std::fs::write(&path, SONG).unwrap();

    let tune = picotune::load_file(&path).unwrap();
    assert_eq!(tune.name, "testsong");
    assert_eq!(tune.sequence, vec!["verse", "verse", "chorus"]);

    assert!(matches!(
        picotune::load_file(dir.path().join("missing.tune")),
        Err(picotune::PicoError::Io(_))
    ));
}
