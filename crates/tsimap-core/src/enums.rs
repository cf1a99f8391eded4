//! Closed value sets used by mapping records.
//!
//! Every set is open-world on the wire: an integer outside the known set is
//! not an error. Fields keep both the resolved variant (when known) and the
//! raw integer through [`Coded`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed set of wire values.
pub trait CatalogEnum: Copy + Sized {
    type Raw: Copy;

    fn from_raw(raw: Self::Raw) -> Option<Self>;
    fn raw(self) -> Self::Raw;
    /// Stable uppercase label, as used in serialized output.
    fn name(self) -> &'static str;
}

/// Resolved variant plus the original raw integer.
///
/// # Examples
/// ```
/// use tsimap_core::{Coded, InteractionMode};
///
/// let known: Coded<InteractionMode> = Coded::from_raw(3);
/// assert_eq!(known.value, Some(InteractionMode::Direct));
///
/// let unknown: Coded<InteractionMode> = Coded::from_raw(99);
/// assert_eq!(unknown.value, None);
/// assert_eq!(unknown.raw, 99);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coded<T, R = u32> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    pub raw: R,
}

impl<T: CatalogEnum> Coded<T, T::Raw> {
    pub fn from_raw(raw: T::Raw) -> Self {
        Self {
            value: T::from_raw(raw),
            raw,
        }
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some()
    }
}

impl<T: CatalogEnum> Coded<T, T::Raw>
where
    T::Raw: fmt::Display,
{
    /// Variant name when known, otherwise the raw integer.
    pub fn label(&self) -> String {
        match self.value {
            Some(value) => value.name().to_string(),
            None => self.raw.to_string(),
        }
    }
}

macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $raw:ty {
            $($variant:ident = $value:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl CatalogEnum for $name {
            type Raw = $raw;

            fn from_raw(raw: $raw) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn raw(self) -> $raw {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

catalog_enum! {
    /// Mapping direction.
    MappingType: u32 {
        In = 0 => "IN",
        Out = 1 => "OUT",
    }
}

catalog_enum! {
    ControllerType: u32 {
        Button = 0 => "BUTTON",
        FaderOrKnob = 1 => "FADER_OR_KNOB",
        Encoder = 2 => "ENCODER",
        Led = 65535 => "LED",
    }
}

catalog_enum! {
    InteractionMode: u32 {
        Toggle = 1 => "TOGGLE",
        Hold = 2 => "HOLD",
        Direct = 3 => "DIRECT",
        Relative = 4 => "RELATIVE",
        Increment = 5 => "INCREMENT",
        Decrement = 6 => "DECREMENT",
        Reset = 7 => "RESET",
        Output = 8 => "OUTPUT",
    }
}

catalog_enum! {
    /// Per-mapping deck scope; -1 inherits the device target.
    DeckScope: i32 {
        DeviceTarget = -1 => "DEVICE_TARGET_DECK",
        DeckAOrFx1 = 0 => "A_OR_FX1_OR_REMIX1_SLOT1_OR_GLOBAL",
        DeckBOrFx2 = 1 => "B_OR_FX2_OR_REMIX1_SLOT2",
        DeckCOrFx3 = 2 => "C_OR_FX3_OR_REMIX1_SLOT3",
        DeckDOrFx4 = 3 => "D_OR_FX4_OR_REMIX1_SLOT4",
        Remix2Slot1 = 4 => "REMIX2_SLOT1",
        Remix2Slot2 = 5 => "REMIX2_SLOT2",
        Remix2Slot3 = 6 => "REMIX2_SLOT3",
        Remix2Slot4 = 7 => "REMIX2_SLOT4",
        Remix3Slot1 = 8 => "REMIX3_SLOT1",
        Remix3Slot2 = 9 => "REMIX3_SLOT2",
        Remix3Slot3 = 10 => "REMIX3_SLOT3",
        Remix3Slot4 = 11 => "REMIX3_SLOT4",
        Remix4Slot1 = 12 => "REMIX4_SLOT1",
        Remix4Slot2 = 13 => "REMIX4_SLOT2",
        Remix4Slot3 = 14 => "REMIX4_SLOT3",
        Remix4Slot4 = 15 => "REMIX4_SLOT4",
    }
}

catalog_enum! {
    /// Step granularity, stored as the bit pattern of an f32.
    Resolution: u32 {
        Fine = 0x3C80_0000 => "FINE",
        Default = 0x3D80_0000 => "DEFAULT",
        Coarse = 0x3E00_0000 => "COARSE",
        Switch = 0x3F00_0000 => "SWITCH",
    }
}

impl Resolution {
    pub fn step(self) -> f32 {
        f32::from_bits(self.raw())
    }
}

catalog_enum! {
    /// Relative encoder delta coding of a MIDI definition.
    EncoderMode: u32 {
        Mode3Fh41h = 0 => "3FH_41H",
        Mode7Fh01h = 1 => "7FH_01H",
    }
}

catalog_enum! {
    /// Device-level target set by the target-info frame.
    DeviceTarget: u32 {
        Focus = 0 => "FOCUS",
        DeckA = 1 => "DECK_A",
        DeckB = 2 => "DECK_B",
        DeckC = 3 => "DECK_C",
        DeckD = 4 => "DECK_D",
    }
}
