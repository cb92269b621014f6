use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};

/// Deployment game variant. Selects the shape of every account's upgrade
/// record and which upgrade kinds are purchasable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameVariant {
    /// Coins-and-upgrades racing: engine levels, rims, turbo.
    Circuit = 0,
    /// Ticket racing with a single car-speed progression.
    Sprint = 1,
    /// Ticket fight-betting; no purchasable upgrades.
    Arena = 2,
}

impl GameVariant {
    /// Whether this deployment offers the given upgrade kind at all.
    pub fn offers(&self, kind: UpgradeKind) -> bool {
        matches!(
            (self, kind),
            (Self::Circuit, UpgradeKind::Engine)
                | (Self::Circuit, UpgradeKind::Rims)
                | (Self::Circuit, UpgradeKind::Turbo)
                | (Self::Sprint, UpgradeKind::CarSpeed)
        )
    }
}

/// Purchasable upgrade kinds across all variants.
///
/// `Engine` and `CarSpeed` are leveled (each purchase advances one level up to
/// a configured maximum); `Rims` and `Turbo` are flag upgrades with a single
/// target tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Engine,
    Rims,
    Turbo,
    CarSpeed,
}

/// Rim cosmetic tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RimTier {
    Stock = 0,
    Spinner = 1,
}

impl Write for RimTier {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for RimTier {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Stock),
            1 => Ok(Self::Spinner),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for RimTier {
    const SIZE: usize = 1;
}

/// Variant-tagged upgrade progression record.
///
/// One generalized account shape carries whichever record the deployment's
/// variant prescribes; the tag never changes after registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeState {
    Circuit {
        engine_level: u8,
        rims: RimTier,
        turbo: bool,
    },
    Sprint {
        car_speed: u8,
    },
    Arena,
}

impl UpgradeState {
    /// Default progression record for a freshly registered account.
    pub fn for_variant(variant: GameVariant) -> Self {
        match variant {
            GameVariant::Circuit => Self::Circuit {
                engine_level: 1,
                rims: RimTier::Stock,
                turbo: false,
            },
            GameVariant::Sprint => Self::Sprint { car_speed: 1 },
            GameVariant::Arena => Self::Arena,
        }
    }
}

impl Write for UpgradeState {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Circuit {
                engine_level,
                rims,
                turbo,
            } => {
                0u8.write(writer);
                engine_level.write(writer);
                rims.write(writer);
                turbo.write(writer);
            }
            Self::Sprint { car_speed } => {
                1u8.write(writer);
                car_speed.write(writer);
            }
            Self::Arena => {
                2u8.write(writer);
            }
        }
    }
}

impl Read for UpgradeState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Circuit {
                engine_level: u8::read(reader)?,
                rims: RimTier::read(reader)?,
                turbo: bool::read(reader)?,
            }),
            1 => Ok(Self::Sprint {
                car_speed: u8::read(reader)?,
            }),
            2 => Ok(Self::Arena),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for UpgradeState {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Circuit { .. } => u8::SIZE + RimTier::SIZE + bool::SIZE,
                Self::Sprint { .. } => u8::SIZE,
                Self::Arena => 0,
            }
    }
}

/// Wager resolution supplied by the (external) game layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WagerOutcome {
    Won,
    Lost,
}
