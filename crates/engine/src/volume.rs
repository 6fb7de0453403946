const CURVE_EXPONENT: f64 = 3.0;
const EPSILON: f64 = 1e-6;

/// Maps a linear slider position to output gain.
pub fn slider_to_gain(position: f64) -> f64 {
    clamp_unit(position).powf(CURVE_EXPONENT)
}

pub fn gain_to_slider(gain: f64) -> f64 {
    clamp_unit(gain).cbrt()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Slider-side view of an audio output's volume and mute state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeControl {
    position: f64,
    gain: f64,
    muted: bool,
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::from_output(1.0, false)
    }
}

impl VolumeControl {
    pub fn from_output(gain: f64, muted: bool) -> Self {
        let gain = clamp_unit(gain);
        Self {
            position: gain_to_slider(gain),
            gain,
            muted,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn effective_gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.gain
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Moves the slider. Returns the new output gain, or `None` when the gain
    /// is unchanged.
    pub fn set_position(&mut self, position: f64) -> Option<f64> {
        let position = clamp_unit(position);
        let gain = slider_to_gain(position);
        self.position = position;
        if nearly_equal(self.gain, gain) {
            return None;
        }
        self.gain = gain;
        Some(gain)
    }

    pub fn output_gain_changed(&mut self, gain: f64) -> bool {
        self.gain = clamp_unit(gain);
        let position = gain_to_slider(self.gain);
        if nearly_equal(self.position, position) {
            return false;
        }
        self.position = position;
        true
    }

    pub fn set_muted(&mut self, muted: bool) -> bool {
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        true
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}
