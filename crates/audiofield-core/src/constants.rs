use glam::Vec3;

// Shared visual/audio tuning constants used by both web and native frontends.

// Palette
pub const TEAL: [f32; 3] = [120.0 / 255.0, 190.0 / 255.0, 186.0 / 255.0]; // accent A
pub const RED: [f32; 3] = [211.0 / 255.0, 82.0 / 255.0, 51.0 / 255.0]; // accent B
pub const YELLOW: [f32; 3] = [231.0 / 255.0, 178.0 / 255.0, 37.0 / 255.0];
pub const BLUE: [f32; 3] = [44.0 / 255.0, 90.0 / 255.0, 160.0 / 255.0];
pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
pub const CLOUD_WHITE: [f32; 3] = [226.0 / 255.0, 227.0 / 255.0, 216.0 / 255.0];
pub const EYE_BLACK: [f32; 3] = [17.0 / 255.0, 17.0 / 255.0, 17.0 / 255.0];

// Analyser (mirrors a WebAudio AnalyserNode)
pub const DEFAULT_FFT_SIZE: usize = 2048;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

// Idle signal
pub const IDLE_WAVE_POINTS: usize = 100;
pub const IDLE_BARS: usize = 64;
pub const IDLE_LEVEL_RATE: f32 = 2.0; // rad/s of the idle audio-level sinusoid

// Mode switch
pub const CROSSFADE_SECS: f32 = 0.35; // idle <-> live blend time

// 2D panels
pub const WAVE_LINE_WIDTH: f32 = 2.0;
pub const SPECTRUM_BAR_SCALE: f32 = 2.5;
pub const SPECTRUM_BAR_GAP: f32 = 1.0;

// Particle field
pub const PARTICLE_COUNT: usize = 5000;
pub const SHELL_RADIUS_MIN: f32 = 1.0;
pub const SHELL_RADIUS_SPAN: f32 = 0.5;
pub const PARTICLE_DISPLACEMENT: f32 = 0.5; // magnitude -> displacement
pub const PARTICLE_RADIAL_GAIN: f32 = 0.2; // displacement -> radial scale
pub const IDLE_PULSE_DEPTH: f32 = 0.1;
pub const IDLE_PULSE_PHASE_STEP: f32 = 0.1;
pub const FIELD_SPIN_X: f32 = 0.001; // rad per frame
pub const FIELD_SPIN_Y: f32 = 0.002; // rad per frame
pub const PARTICLE_SIZE: f32 = 0.05;

// Cloud
pub const CLOUD_RADIUS: f32 = 1.2;
pub const CLOUD_CENTER: Vec3 = Vec3::new(0.0, 0.0, -2.0);
pub const CLOUD_BASE_SCALE: Vec3 = Vec3::new(1.0, 0.9, 0.8);
pub const CLOUD_LEVEL_SCALE: f32 = 0.2;
pub const CLOUD_SPIN: f32 = 0.2; // rad/s
pub const EYE_RADIUS: f32 = 0.2;
pub const EYE_OFFSETS: [[f32; 3]; 2] = [[-0.4, 0.1, 0.9], [0.4, 0.1, 0.9]];

// Wave mesh
pub const WAVE_PLANE_SIZE: f32 = 10.0;
pub const WAVE_SEGMENTS: usize = 128;
pub const WAVE_PLANE_Y: f32 = -2.0;
pub const WAVE_AMPLITUDE_BASE: f32 = 0.1;
pub const WAVE_AMPLITUDE_LEVEL: f32 = 0.5;
pub const WAVE_FREQUENCY_BASE: f32 = 0.5;
pub const WAVE_FREQUENCY_LEVEL: f32 = 2.0;
pub const WAVE_ALPHA: f32 = 0.7;

// Halftone
pub const HALFTONE_COUNT: usize = 2000;
pub const HALFTONE_EXTENT: f32 = 4.0;
pub const HALFTONE_Z: f32 = -5.0;
pub const HALFTONE_DOT_SIZE: f32 = 0.05;
pub const HALFTONE_LEVEL_GAIN: f32 = 2.0;
pub const HALFTONE_SPIN: f32 = 0.1; // rad/s

// Drips
pub const DRIP_COUNT: usize = 100;
pub const DRIP_SPAWN_Y: f32 = 3.0;
pub const DRIP_SPREAD: f32 = 6.0;
pub const DRIP_Z_OFFSET: f32 = -2.0;
pub const DRIP_LEVEL_SPEEDUP: f32 = 2.0;
pub const DRIP_STRETCH: f32 = 0.1;
pub const DRIP_ALPHA: f32 = 0.7;

// Post-processing defaults
pub const BLOOM_STRENGTH: f32 = 1.5;
pub const BLOOM_RADIUS: f32 = 0.4;
pub const BLOOM_THRESHOLD: f32 = 0.85;
pub const NOISE_BASE: f32 = 0.03;
pub const NOISE_LEVEL_GAIN: f32 = 0.1;

// Camera
pub const CAMERA_Z: f32 = 5.0;
pub const CAMERA_FOVY_DEGREES: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Orbit (drag to rotate, no zoom)
/// Fraction of the pending rotation applied each frame.
pub const ORBIT_DAMPING: f32 = 0.05;
/// Full turns per viewport height of drag.
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
/// Keeps the eye off the poles so `up` stays valid.
pub const ORBIT_PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
