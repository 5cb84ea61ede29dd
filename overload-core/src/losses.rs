use crate::imports::*;
use crate::materials::ConductorKind;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, ApproxEq, Validate)]
/// Transformer losses in watts, referred to `reference_temperature`.
///
/// Values are immutable snapshots: projecting them to another load or
/// temperature returns a new `Losses`.
pub struct Losses {
    pub conductor: ConductorKind,
    /// temperature at which the load losses were measured, °C
    pub reference_temperature: f64,
    /// no-load (core) loss
    #[validate(range(min = 0))]
    pub core_loss: f64,
    /// core loss with the core overexcited
    #[validate(range(min = 0))]
    pub core_loss_with_overexcitation: f64,
    /// winding I²R loss
    #[validate(range(min = 0))]
    pub winding_resistive_loss: f64,
    #[validate(range(min = 0))]
    pub winding_eddy_loss: f64,
    /// eddy loss at the hot-spot, per unit of the I²R loss there
    #[validate(range(min = 0))]
    winding_hotspot_eddy_loss_pu: f64,
    /// stray loss in tank, clamps and other structural parts
    #[validate(range(min = 0))]
    pub stray_loss: f64,
}

impl SerdeAPI for Losses {
    fn init(&mut self) -> anyhow::Result<()> {
        match self.validate() {
            Ok(_) => (),
            Err(e) => bail!(e),
        };
        self.winding_hotspot_eddy_loss_pu =
            self.clamped_hotspot_eddy_loss_pu(self.winding_hotspot_eddy_loss_pu);
        Ok(())
    }
}

impl Losses {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conductor: ConductorKind,
        reference_temperature: f64,
        core_loss: f64,
        core_loss_with_overexcitation: f64,
        winding_resistive_loss: f64,
        winding_eddy_loss: f64,
        winding_hotspot_eddy_loss_pu: f64,
        stray_loss: f64,
    ) -> Self {
        let losses = Self {
            conductor,
            reference_temperature,
            core_loss,
            core_loss_with_overexcitation,
            winding_resistive_loss,
            winding_eddy_loss,
            winding_hotspot_eddy_loss_pu: 0.0,
            stray_loss,
        };
        losses.with_winding_hotspot_eddy_loss_pu(winding_hotspot_eddy_loss_pu)
    }

    /// Hot-spot eddy loss cannot be lower than the winding-average eddy loss.
    fn clamped_hotspot_eddy_loss_pu(&self, requested: f64) -> f64 {
        requested.max(self.winding_average_eddy_loss_pu())
    }

    pub fn winding_hotspot_eddy_loss_pu(&self) -> f64 {
        self.winding_hotspot_eddy_loss_pu
    }

    /// Returns a copy with the hot-spot eddy loss PU set, raised to the
    /// winding-average value if lower.
    pub fn with_winding_hotspot_eddy_loss_pu(mut self, eddy_pu: f64) -> Self {
        self.winding_hotspot_eddy_loss_pu = self.clamped_hotspot_eddy_loss_pu(eddy_pu);
        self
    }

    /// Average winding eddy loss per unit of the I²R loss
    pub fn winding_average_eddy_loss_pu(&self) -> f64 {
        if self.winding_resistive_loss > 0.0 {
            self.winding_eddy_loss / self.winding_resistive_loss
        } else {
            0.0
        }
    }

    /// Returns a copy whose eddy loss is `eddy_pu` times the I²R loss
    pub fn with_winding_average_eddy_loss_pu(mut self, eddy_pu: f64) -> Self {
        self.winding_eddy_loss = eddy_pu * self.winding_resistive_loss;
        let requested = self.winding_hotspot_eddy_loss_pu;
        self.with_winding_hotspot_eddy_loss_pu(requested)
    }

    /// Ratio of conductor resistance at `new_temp` to that at the reference temperature
    pub fn temperature_correction_factor(&self, new_temp: f64) -> f64 {
        let tk = self.conductor.temperature_factor();
        (new_temp + tk) / (self.reference_temperature + tk)
    }

    /// Sum of core, winding and stray losses
    pub fn total_loss(&self, with_overexcitation: bool) -> f64 {
        let core = if with_overexcitation {
            self.core_loss_with_overexcitation
        } else {
            self.core_loss
        };
        core + self.winding_resistive_loss + self.winding_eddy_loss + self.stray_loss
    }

    pub fn corrected_winding_resistive_loss(&self, new_temp: f64) -> f64 {
        self.winding_resistive_loss * self.temperature_correction_factor(new_temp)
    }

    pub fn corrected_winding_eddy_loss(&self, new_temp: f64) -> f64 {
        self.winding_eddy_loss / self.temperature_correction_factor(new_temp)
    }

    pub fn corrected_stray_loss(&self, new_temp: f64) -> f64 {
        self.stray_loss / self.temperature_correction_factor(new_temp)
    }

    pub fn corrected_winding_total_loss(&self, new_temp: f64) -> f64 {
        self.corrected_winding_resistive_loss(new_temp) + self.corrected_winding_eddy_loss(new_temp)
    }

    /// Winding resistive plus eddy loss
    pub fn winding_loss(&self) -> f64 {
        self.winding_resistive_loss + self.winding_eddy_loss
    }

    /// Projects the losses to per-unit load `k` and conductor temperature
    /// `new_temp`. Load losses scale with `k²`; resistive loss rises with
    /// temperature while eddy and stray losses fall. Core losses and the
    /// hot-spot eddy PU carry through.
    pub fn losses_at_load_and_temperature(&self, k: f64, new_temp: f64) -> Self {
        let k_squared = k * k;
        Self {
            reference_temperature: new_temp,
            winding_resistive_loss: k_squared * self.corrected_winding_resistive_loss(new_temp),
            winding_eddy_loss: k_squared * self.corrected_winding_eddy_loss(new_temp),
            stray_loss: k_squared * self.corrected_stray_loss(new_temp),
            ..self.clone()
        }
    }

    /// Projects the losses to per-unit load `k` at the reference temperature
    pub fn losses_at_load_factor(&self, k: f64) -> Self {
        let k_squared = k * k;
        Self {
            winding_resistive_loss: k_squared * self.winding_resistive_loss,
            winding_eddy_loss: k_squared * self.winding_eddy_loss,
            stray_loss: k_squared * self.stray_loss,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn tested() -> Losses {
        Losses::new(
            ConductorKind::Copper,
            75.0,
            36_986.0,
            45_000.0,
            51_690.0,
            5_000.0,
            0.05,
            21_078.0,
        )
    }

    #[test]
    fn test_hotspot_eddy_pu_clamped_to_average() {
        let losses = tested();
        let average = 5_000.0 / 51_690.0;
        assert_relative_eq!(losses.winding_average_eddy_loss_pu(), average);
        assert_relative_eq!(losses.winding_hotspot_eddy_loss_pu(), average);
        let losses = losses.with_winding_hotspot_eddy_loss_pu(0.3);
        assert_eq!(losses.winding_hotspot_eddy_loss_pu(), 0.3);
    }

    #[test]
    fn test_clamp_applies_on_deserialization() {
        let mut losses = tested().with_winding_hotspot_eddy_loss_pu(0.3);
        losses.winding_hotspot_eddy_loss_pu = 0.01;
        let yaml = losses.to_yaml().unwrap();
        let losses = Losses::from_yaml(yaml).unwrap();
        assert_relative_eq!(
            losses.winding_hotspot_eddy_loss_pu(),
            losses.winding_average_eddy_loss_pu()
        );
    }

    #[test]
    fn test_negative_loss_is_rejected() {
        let mut losses = tested();
        losses.stray_loss = -1.0;
        let err = Losses::from_yaml(losses.to_yaml().unwrap()).unwrap_err();
        assert!(err.downcast_ref::<validator::ValidationErrors>().is_some());
    }

    #[test]
    fn test_average_eddy_pu_builder() {
        let losses = tested().with_winding_average_eddy_loss_pu(0.2);
        assert_relative_eq!(losses.winding_eddy_loss, 0.2 * 51_690.0);
        assert!(losses.winding_hotspot_eddy_loss_pu() >= 0.2);
    }

    #[test]
    fn test_total_loss() {
        let losses = tested();
        assert_relative_eq!(losses.total_loss(false), 36_986.0 + 51_690.0 + 5_000.0 + 21_078.0);
        assert_relative_eq!(losses.total_loss(true), 45_000.0 + 51_690.0 + 5_000.0 + 21_078.0);
    }

    #[test]
    fn test_load_factor_scales_load_losses_only() {
        let losses = tested().losses_at_load_factor(2.0);
        assert_relative_eq!(losses.winding_resistive_loss, 4.0 * 51_690.0);
        assert_relative_eq!(losses.winding_eddy_loss, 4.0 * 5_000.0);
        assert_relative_eq!(losses.stray_loss, 4.0 * 21_078.0);
        assert_eq!(losses.core_loss, 36_986.0);
        assert_eq!(losses.reference_temperature, 75.0);
    }

    #[test]
    fn test_temperature_projection() {
        let base = tested();
        let hot = base.losses_at_load_and_temperature(1.0, 95.0);
        let tc = (95.0 + 234.5) / (75.0 + 234.5);
        assert_relative_eq!(hot.winding_resistive_loss, 51_690.0 * tc);
        assert_relative_eq!(hot.winding_eddy_loss, 5_000.0 / tc);
        assert_relative_eq!(hot.stray_loss, 21_078.0 / tc);
        assert_eq!(hot.reference_temperature, 95.0);
        assert_relative_eq!(
            base.corrected_winding_total_loss(95.0),
            hot.winding_resistive_loss + hot.winding_eddy_loss
        );
    }

    #[test]
    fn test_aluminum_temperature_factor() {
        let mut losses = tested();
        losses.conductor = ConductorKind::Aluminum;
        assert_relative_eq!(
            losses.temperature_correction_factor(85.0),
            (85.0 + 225.0) / (75.0 + 225.0)
        );
    }

    proptest! {
        #[test]
        fn test_correction_factor_is_unity_at_reference(reference in -40.0..200.0_f64) {
            let mut losses = tested();
            losses.reference_temperature = reference;
            prop_assert_eq!(losses.temperature_correction_factor(reference), 1.0);
            let same = losses.losses_at_load_and_temperature(1.0, reference);
            let expected = Losses { reference_temperature: reference, ..losses.clone() };
            prop_assert!(same.approx_eq(&expected, 1e-12));
        }
    }
}
