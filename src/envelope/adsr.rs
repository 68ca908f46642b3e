use super::{EnvelopeGenerator, EnvelopeParameters};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdsrStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// An envelope generator with linear attack, decay and release segments.
#[derive(Clone, Debug)]
pub struct Adsr {
    parameters: EnvelopeParameters,
    sample_rate: f64,
    stage: AdsrStage,
    level: f32,
    // Level change per frame. A negative rate means the segment is skipped.
    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new()
    }
}

impl Adsr {
    pub fn new() -> Self {
        let mut adsr = Self {
            parameters: EnvelopeParameters::default(),
            sample_rate: 44100.0,
            stage: AdsrStage::Idle,
            level: 0.0,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        adsr.recalculate_rates();
        adsr
    }

    pub fn stage(&self) -> AdsrStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn parameters(&self) -> EnvelopeParameters {
        self.parameters
    }

    fn rate(&self, distance: f32, seconds: f32) -> f32 {
        if seconds > 0.0 && self.sample_rate > 0.0 {
            (distance as f64 / (seconds as f64 * self.sample_rate)) as f32
        } else {
            -1.0
        }
    }

    fn recalculate_rates(&mut self) {
        let p = self.parameters;
        self.attack_rate = self.rate(1.0, p.attack);
        self.decay_rate = self.rate(1.0 - p.sustain, p.decay);
        self.release_rate = self.rate(p.sustain, p.release);

        let skip = match self.stage {
            AdsrStage::Attack => self.attack_rate <= 0.0,
            AdsrStage::Decay => self.decay_rate <= 0.0 || self.level <= p.sustain,
            AdsrStage::Release => self.release_rate <= 0.0,
            AdsrStage::Idle | AdsrStage::Sustain => false,
        };
        if skip {
            self.go_to_next_stage();
        }
    }

    fn go_to_next_stage(&mut self) {
        match self.stage {
            AdsrStage::Attack => {
                self.stage = if self.decay_rate > 0.0 {
                    AdsrStage::Decay
                } else {
                    self.level = self.parameters.sustain;
                    AdsrStage::Sustain
                };
            }
            AdsrStage::Decay => {
                self.stage = AdsrStage::Sustain;
            }
            AdsrStage::Release => self.reset(),
            AdsrStage::Idle | AdsrStage::Sustain => {}
        }
    }
}

impl EnvelopeGenerator for Adsr {
    fn set_sample_rate(&mut self, sample_rate: f64) {
        debug_assert!(sample_rate > 0.0);
        self.sample_rate = sample_rate;
        self.recalculate_rates();
    }

    fn set_parameters(&mut self, parameters: EnvelopeParameters) {
        self.parameters = EnvelopeParameters {
            sustain: parameters.sustain.max(0.0).min(1.0),
            ..parameters
        };
        self.recalculate_rates();
    }

    fn note_on(&mut self) {
        if self.attack_rate > 0.0 {
            self.stage = AdsrStage::Attack;
        } else if self.decay_rate > 0.0 {
            self.level = 1.0;
            self.stage = AdsrStage::Decay;
        } else {
            self.level = self.parameters.sustain;
            self.stage = AdsrStage::Sustain;
        }
    }

    fn note_off(&mut self) {
        if self.stage == AdsrStage::Idle {
            return;
        }
        if self.parameters.release > 0.0 && self.sample_rate > 0.0 {
            // Release from wherever the envelope is now, not from the sustain level.
            self.release_rate =
                (self.level as f64 / (self.parameters.release as f64 * self.sample_rate)) as f32;
            self.stage = AdsrStage::Release;
        } else {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.level = 0.0;
        self.stage = AdsrStage::Idle;
    }

    fn next_sample(&mut self) -> f32 {
        match self.stage {
            AdsrStage::Idle => return 0.0,
            AdsrStage::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.go_to_next_stage();
                }
            }
            AdsrStage::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.parameters.sustain {
                    self.level = self.parameters.sustain;
                    self.go_to_next_stage();
                }
            }
            AdsrStage::Sustain => {
                self.level = self.parameters.sustain;
            }
            AdsrStage::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.go_to_next_stage();
                }
            }
        }
        self.level
    }

    fn is_active(&self) -> bool {
        self.stage != AdsrStage::Idle
    }
}
