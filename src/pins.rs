//! GPIO / peripheral pin assignments for the SortBin main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Carousel stepper driver (A4988 step/dir interface)
// ---------------------------------------------------------------------------

/// Digital output: one rising edge = one motor step.
pub const STEP_GPIO: i32 = 12;
/// Digital output: HIGH = clockwise, LOW = counter-clockwise.
pub const DIR_GPIO: i32 = 13;
/// Digital output: driver enable (active LOW on A4988).
pub const STEPPER_EN_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Trapdoor gate servo (SG90, 50 Hz PWM)
// ---------------------------------------------------------------------------

/// LEDC PWM output for the gate servo signal line.
#[allow(dead_code)] // referenced only by the espidf LEDC bring-up
pub const GATE_SERVO_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Object detection (IR break-beam / proximity module)
// ---------------------------------------------------------------------------

/// Digital input from the IR receiver. The asserted level is configurable
/// (`SystemConfig::sensor_active_low`); most break-beam modules pull LOW
/// when the beam is interrupted.
pub const IR_SENSOR_GPIO: i32 = 33;

// ---------------------------------------------------------------------------
// Feedback buzzer (active piezo, driven as plain GPIO)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits). 14-bit gives fine servo pulse control.
#[allow(dead_code)] // referenced only by the espidf LEDC bring-up
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Standard hobby-servo frame rate.
#[allow(dead_code)] // referenced only by the espidf LEDC bring-up
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

// ---------------------------------------------------------------------------
// Camera (OV2640, DVP interface)
// ---------------------------------------------------------------------------
//
// The camera occupies the fixed DVP pin group of the ESP32-S3-CAM module
// (XCLK/PCLK/VSYNC/HREF + D0-D7 + SCCB). Those assignments are owned by the
// esp32-camera component config, not by firmware code, so they are not
// duplicated here.
