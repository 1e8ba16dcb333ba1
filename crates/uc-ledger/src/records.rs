use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uc_crypto::{Canonical, CanonicalBytes, CanonicalPayload, ChainLink, EncodingError};
use uc_types::{ActorId, ActorRef, ActorRole, BatchId, Channel, Digest, RecordId, Timestamp};

use crate::error::LedgerError;
use crate::validation;

/// The channel-specific body of a ledger record.
///
/// Implemented by [`EconomicTx`] and [`QualityTx`]. The associated
/// `CHANNEL` ties each payload type to exactly one chain, so an economic
/// payload can never be sealed onto the quality channel.
pub trait ChannelPayload:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const CHANNEL: Channel;

    fn batch_id(&self) -> Option<&BatchId>;

    /// Reject malformed input before anything is sealed.
    fn validate(&self) -> Result<(), LedgerError>;

    /// Add this payload's fields to a record's canonical mapping.
    fn write_fields(&self, out: &mut CanonicalPayload) -> Result<(), EncodingError>;

    /// One-line human-readable description.
    fn summary(&self) -> String;
}

// ---------------------------------------------------------------------------
// Economic channel
// ---------------------------------------------------------------------------

/// How value moved between the two parties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "UPI")]
    Upi,
    Cash,
    Settlement,
    Other(String),
}

impl PaymentMethod {
    /// Stable text used in the canonical encoding.
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Upi => "UPI".into(),
            Self::Cash => "Cash".into(),
            Self::Settlement => "Settlement".into(),
            Self::Other(name) => format!("Other:{name}"),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(name) => f.write_str(name),
            other => f.write_str(&other.canonical_name()),
        }
    }
}

/// The supply-chain step an economic record documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EconomicEvent {
    /// A farmer registers a new harvest.
    #[serde(rename_all = "camelCase")]
    Register {
        variety: String,
        farming_method: String,
    },
    /// A transporter collects the batch.
    #[serde(rename_all = "camelCase")]
    Pickup { vehicle_rc: String },
    Dropoff,
    Receive,
    /// A retailer sells part of the stock.
    #[serde(rename_all = "camelCase")]
    Sale {
        units_sold: f64,
        sale_price_per_unit: f64,
    },
}

impl EconomicEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "REGISTER",
            Self::Pickup { .. } => "PICKUP",
            Self::Dropoff => "DROPOFF",
            Self::Receive => "RECEIVE",
            Self::Sale { .. } => "SALE",
        }
    }

    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        let mut out = CanonicalPayload::new();
        out.insert("type", self.kind())?;
        match self {
            Self::Register {
                variety,
                farming_method,
            } => {
                out.insert("variety", variety.as_str())?
                    .insert("farmingMethod", farming_method.as_str())?;
            }
            Self::Pickup { vehicle_rc } => {
                out.insert("vehicleRc", vehicle_rc.as_str())?;
            }
            Self::Dropoff | Self::Receive => {}
            Self::Sale {
                units_sold,
                sale_price_per_unit,
            } => {
                out.insert("unitsSold", *units_sold)?
                    .insert("salePricePerUnit", *sale_price_per_unit)?;
            }
        }
        Ok(out)
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

/// A payment or custody hand-off between two supply-chain actors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicTx {
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    pub from_party: ActorRole,
    pub to_party: ActorRole,
    #[serde(default)]
    pub from_actor_id: Option<ActorId>,
    #[serde(default)]
    pub to_actor_id: Option<ActorId>,
    pub product: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_id: Option<String>,
    pub event: EconomicEvent,
}

impl EconomicTx {
    pub fn new(
        from_party: ActorRole,
        to_party: ActorRole,
        product: impl Into<String>,
        amount: f64,
        payment_method: PaymentMethod,
        event: EconomicEvent,
    ) -> Self {
        Self {
            batch_id: None,
            from_party,
            to_party,
            from_actor_id: None,
            to_actor_id: None,
            product: product.into(),
            quantity: None,
            unit: None,
            amount,
            currency: default_currency(),
            payment_method,
            order_id: None,
            event,
        }
    }

    pub fn with_batch(mut self, batch_id: impl Into<BatchId>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_quantity(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_actors(mut self, from: impl Into<ActorId>, to: impl Into<ActorId>) -> Self {
        self.from_actor_id = Some(from.into());
        self.to_actor_id = Some(to.into());
        self
    }

    pub fn with_order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

impl ChannelPayload for EconomicTx {
    const CHANNEL: Channel = Channel::Economic;

    fn batch_id(&self) -> Option<&BatchId> {
        self.batch_id.as_ref()
    }

    fn validate(&self) -> Result<(), LedgerError> {
        validation::validate_economic(self)
    }

    fn write_fields(&self, out: &mut CanonicalPayload) -> Result<(), EncodingError> {
        out.insert("fromParty", self.from_party.as_str())?
            .insert("toParty", self.to_party.as_str())?
            .insert_opt("fromActorId", self.from_actor_id.as_ref().map(ActorId::as_str))?
            .insert_opt("toActorId", self.to_actor_id.as_ref().map(ActorId::as_str))?
            .insert("product", self.product.as_str())?
            .insert_opt("quantity", self.quantity)?
            .insert_opt("unit", self.unit.as_deref())?
            .insert("amount", self.amount)?
            .insert("currency", self.currency.as_str())?
            .insert("paymentMethod", self.payment_method.canonical_name())?
            .insert_opt("orderId", self.order_id.as_deref())?
            .nest("event", self.event.canonical_payload()?)?;
        Ok(())
    }

    fn summary(&self) -> String {
        let mut summary = format!("{} {}", self.event.kind(), self.product);
        if let Some(quantity) = self.quantity {
            summary.push_str(&format!(" {quantity}"));
            if let Some(unit) = &self.unit {
                summary.push_str(&format!(" {unit}"));
            }
        }
        summary.push_str(&format!(
            " {} -> {} {:.2} {} via {}",
            self.from_party, self.to_party, self.amount, self.currency, self.payment_method
        ));
        summary
    }
}

// ---------------------------------------------------------------------------
// Quality channel
// ---------------------------------------------------------------------------

/// Where in the supply chain an inspection happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStage {
    Harvest,
    Sorting,
    Transport,
    Retail,
}

impl QualityStage {
    pub const ALL: [QualityStage; 4] = [
        QualityStage::Harvest,
        QualityStage::Sorting,
        QualityStage::Transport,
        QualityStage::Retail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harvest => "harvest",
            Self::Sorting => "sorting",
            Self::Transport => "transport",
            Self::Retail => "retail",
        }
    }
}

impl fmt::Display for QualityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QualityStage {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::invalid("stage", format!("unknown stage {s:?}")))
    }
}

/// A quality inspection of a batch at one stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTx {
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    /// The inspecting actor.
    pub actor: ActorRef,
    pub stage: QualityStage,
    /// Score on the 0..=100 scale.
    pub quality_score: u8,
    /// Percent.
    pub moisture_level: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    #[serde(default)]
    pub spoilage_detected: bool,
    /// Digest from the image-verification pipeline.
    #[serde(default)]
    pub verification_hash: String,
    /// Merkle root over the raw IoT sensor readings.
    #[serde(default)]
    pub merkle_root: String,
}

impl QualityTx {
    pub fn new(
        actor: ActorRef,
        stage: QualityStage,
        quality_score: u8,
        moisture_level: f64,
        temperature: f64,
    ) -> Self {
        Self {
            batch_id: None,
            actor,
            stage,
            quality_score,
            moisture_level,
            temperature,
            spoilage_detected: false,
            verification_hash: String::new(),
            merkle_root: String::new(),
        }
    }

    pub fn with_batch(mut self, batch_id: impl Into<BatchId>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_evidence(
        mut self,
        verification_hash: impl Into<String>,
        merkle_root: impl Into<String>,
    ) -> Self {
        self.verification_hash = verification_hash.into();
        self.merkle_root = merkle_root.into();
        self
    }

    pub fn with_spoilage(mut self, detected: bool) -> Self {
        self.spoilage_detected = detected;
        self
    }
}

impl ChannelPayload for QualityTx {
    const CHANNEL: Channel = Channel::Quality;

    fn batch_id(&self) -> Option<&BatchId> {
        self.batch_id.as_ref()
    }

    fn validate(&self) -> Result<(), LedgerError> {
        validation::validate_quality(self)
    }

    fn write_fields(&self, out: &mut CanonicalPayload) -> Result<(), EncodingError> {
        out.insert("actor.id", self.actor.id.as_str())?
            .insert("actor.role", self.actor.role.as_str())?
            .insert("stage", self.stage.as_str())?
            .insert("qualityScore", u32::from(self.quality_score))?
            .insert("moistureLevel", self.moisture_level)?
            .insert("temperature", self.temperature)?
            .insert("spoilageDetected", self.spoilage_detected)?
            .insert("verificationHash", self.verification_hash.as_str())?
            .insert("merkleRoot", self.merkle_root.as_str())?;
        Ok(())
    }

    fn summary(&self) -> String {
        let mut summary = format!(
            "{} score {} moisture {}% temp {}°C",
            self.stage, self.quality_score, self.moisture_level, self.temperature
        );
        if self.spoilage_detected {
            summary.push_str(" SPOILAGE");
        }
        summary
    }
}

// ---------------------------------------------------------------------------
// Sealed records
// ---------------------------------------------------------------------------

/// An immutable, sealed ledger record.
///
/// `hash = BLAKE3(canonical(record without hashes) || prev_hash)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<P> {
    pub id: RecordId,
    pub timestamp: Timestamp,
    pub submitted_by: ActorRef,
    pub payload: P,
    pub prev_hash: Digest,
    pub hash: Digest,
}

pub type EconomicRecord = Record<EconomicTx>;
pub type QualityRecord = Record<QualityTx>;

impl<P: ChannelPayload> Record<P> {
    pub fn channel(&self) -> Channel {
        P::CHANNEL
    }

    /// Display label, e.g. `ECO-000001`.
    pub fn label(&self) -> String {
        self.id.label(P::CHANNEL)
    }

    pub fn batch_id(&self) -> Option<&BatchId> {
        self.payload.batch_id()
    }

    /// Recompute the hash from the record's own fields and its stored prev hash.
    pub fn recompute_hash(&self) -> Result<Digest, EncodingError> {
        let bytes = self.canonical_bytes()?;
        Ok(uc_crypto::HashChainVerifier::compute_hash(
            bytes.as_bytes(),
            &self.prev_hash,
        ))
    }
}

impl<P: ChannelPayload> Canonical for Record<P> {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        let mut out = CanonicalPayload::new();
        out.insert("channel", P::CHANNEL.as_str())?
            .insert("id", self.id.seq())?
            .insert("timestamp", self.timestamp.as_millis())?
            .insert("submittedBy.id", self.submitted_by.id.as_str())?
            .insert("submittedBy.role", self.submitted_by.role.as_str())?
            .insert_opt("batchId", self.payload.batch_id().map(BatchId::as_str))?;
        self.payload.write_fields(&mut out)?;
        Ok(out)
    }
}

impl<P: ChannelPayload> ChainLink for Record<P> {
    fn link_seq(&self) -> u64 {
        self.id.seq()
    }

    fn link_hash(&self) -> Digest {
        self.hash
    }

    fn link_prev_hash(&self) -> Digest {
        self.prev_hash
    }

    fn link_payload(&self) -> Result<CanonicalBytes, EncodingError> {
        self.canonical_bytes()
    }
}

/// A record from either channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum LedgerEntry {
    Economic(EconomicRecord),
    Quality(QualityRecord),
}

impl LedgerEntry {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Economic(_) => Channel::Economic,
            Self::Quality(_) => Channel::Quality,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Self::Economic(r) => r.id,
            Self::Quality(r) => r.id,
        }
    }

    pub fn label(&self) -> String {
        self.id().label(self.channel())
    }

    pub fn hash(&self) -> Digest {
        match self {
            Self::Economic(r) => r.hash,
            Self::Quality(r) => r.hash,
        }
    }

    pub fn prev_hash(&self) -> Digest {
        match self {
            Self::Economic(r) => r.prev_hash,
            Self::Quality(r) => r.prev_hash,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Economic(r) => r.timestamp,
            Self::Quality(r) => r.timestamp,
        }
    }

    pub fn batch_id(&self) -> Option<&BatchId> {
        match self {
            Self::Economic(r) => r.batch_id(),
            Self::Quality(r) => r.batch_id(),
        }
    }

    pub fn submitted_by(&self) -> &ActorRef {
        match self {
            Self::Economic(r) => &r.submitted_by,
            Self::Quality(r) => &r.submitted_by,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Economic(r) => r.payload.summary(),
            Self::Quality(r) => r.payload.summary(),
        }
    }
}

impl From<EconomicRecord> for LedgerEntry {
    fn from(record: EconomicRecord) -> Self {
        Self::Economic(record)
    }
}

impl From<QualityRecord> for LedgerEntry {
    fn from(record: QualityRecord) -> Self {
        Self::Quality(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> EconomicTx {
        EconomicTx::new(
            ActorRole::Farmer,
            ActorRole::System,
            "Rice",
            0.0,
            PaymentMethod::Settlement,
            EconomicEvent::Register {
                variety: "Basmati".into(),
                farming_method: "Organic".into(),
            },
        )
        .with_batch("BATCH-001")
        .with_quantity(100.0, "kg")
    }

    fn sealed(payload: EconomicTx) -> EconomicRecord {
        let mut record = Record {
            id: RecordId::FIRST,
            timestamp: Timestamp::from_millis(1_700_000_000_000),
            submitted_by: ActorRef::new("did:farmer:1", ActorRole::Farmer),
            payload,
            prev_hash: Digest::GENESIS,
            hash: Digest::GENESIS,
        };
        record.hash = record.recompute_hash().unwrap();
        record
    }

    #[test]
    fn canonical_fields_cover_header_and_event() {
        let record = sealed(register());
        let text = record.canonical_bytes().unwrap().as_str().to_string();
        assert!(text.starts_with("{\"amount\":0,"));
        assert!(text.contains("\"batchId\":\"BATCH-001\""));
        assert!(text.contains("\"event.type\":\"REGISTER\""));
        assert!(text.contains("\"event.farmingMethod\":\"Organic\""));
        assert!(text.contains("\"submittedBy.role\":\"FARMER\""));
        assert!(!text.contains("prevHash"));
        assert!(!text.contains("orderId"));
    }

    #[test]
    fn hash_covers_every_payload_field() {
        let original = sealed(register());
        let mut changed = original.clone();
        changed.payload.amount = 0.5;
        assert_ne!(original.hash, changed.recompute_hash().unwrap());

        let mut changed = original.clone();
        changed.payload.event = EconomicEvent::Register {
            variety: "Sona Masuri".into(),
            farming_method: "Organic".into(),
        };
        assert_ne!(original.hash, changed.recompute_hash().unwrap());

        let mut changed = original.clone();
        changed.submitted_by = ActorRef::new("did:farmer:2", ActorRole::Farmer);
        assert_ne!(original.hash, changed.recompute_hash().unwrap());
    }

    #[test]
    fn hash_depends_on_prev_hash() {
        let record = sealed(register());
        let mut relinked = record.clone();
        relinked.prev_hash = Digest::from_bytes([1; 32]);
        assert_ne!(record.hash, relinked.recompute_hash().unwrap());
    }

    #[test]
    fn economic_tx_json_shape() {
        let json = serde_json::json!({
            "fromParty": "RETAILER",
            "toParty": "CONSUMER",
            "product": "Rice",
            "quantity": 10.0,
            "amount": 450.0,
            "paymentMethod": "UPI",
            "event": { "SALE": { "unitsSold": 10.0, "salePricePerUnit": 45.0 } }
        });
        let tx: EconomicTx = serde_json::from_value(json).unwrap();
        assert_eq!(tx.currency, "INR");
        assert_eq!(tx.payment_method, PaymentMethod::Upi);
        assert_eq!(tx.event.kind(), "SALE");
        assert!(tx.batch_id.is_none());
    }

    #[test]
    fn unit_events_parse_from_plain_strings() {
        let event: EconomicEvent = serde_json::from_str("\"DROPOFF\"").unwrap();
        assert_eq!(event, EconomicEvent::Dropoff);
    }

    #[test]
    fn payment_method_names_do_not_collide() {
        assert_ne!(
            PaymentMethod::Upi.canonical_name(),
            PaymentMethod::Other("UPI".into()).canonical_name()
        );
        assert_eq!(PaymentMethod::Other("Barter".into()).to_string(), "Barter");
    }

    #[test]
    fn quality_summary_flags_spoilage() {
        let tx = QualityTx::new(
            ActorRef::new("did:transporter:7", ActorRole::Transporter),
            QualityStage::Transport,
            81,
            9.5,
            6.0,
        )
        .with_spoilage(true);
        assert_eq!(tx.summary(), "transport score 81 moisture 9.5% temp 6°C SPOILAGE");
    }

    #[test]
    fn stage_parses_case_insensitively() {
        assert_eq!("Retail".parse::<QualityStage>().unwrap(), QualityStage::Retail);
        assert!("warehouse".parse::<QualityStage>().is_err());
    }
}
