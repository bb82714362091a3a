//! Context builder — merges the persona block with situational facts.
//!
//! Pure: no I/O, no side effects, deterministic for the same inputs.

use copiloto_core::{Client, Promoter};
use serde::{Deserialize, Serialize};

/// A snapshot of one client's profile for context injection.
///
/// A projection of [`Client`], carrying only what the model should see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub name: String,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub status: Option<String>,
}

impl From<&Client> for ClientSnapshot {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            business_name: client.business_name.clone(),
            business_type: client.business_type.clone(),
            status: Some(client.status.as_str().to_string()),
        }
    }
}

impl ClientSnapshot {
    /// One-line rendering for the instruction block.
    fn render(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(business) = &self.business_name {
            parts.push(business.clone());
        }
        if let Some(kind) = &self.business_type {
            parts.push(kind.clone());
        }
        if let Some(status) = &self.status {
            parts.push(format!("estado: {status}"));
        }
        parts.join(", ")
    }
}

/// Ephemeral, request-scoped facts merged into the model instructions.
/// Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SituationalContext {
    /// Operator (promoter) display name.
    pub promotor_name: Option<String>,
    /// Operating region.
    pub promotor_zona: Option<String>,
    /// Count of the operator's active clients.
    pub clientes_activos: Option<i64>,
    /// A specific client under discussion.
    pub client: Option<ClientSnapshot>,
}

impl SituationalContext {
    /// Context for a promoter's own profile.
    pub fn for_promoter(promoter: &Promoter) -> Self {
        Self {
            promotor_name: Some(promoter.name.clone()),
            promotor_zona: promoter.zona.clone(),
            clientes_activos: Some(promoter.clientes_activos),
            client: None,
        }
    }

    /// Attach a client snapshot.
    pub fn with_client(mut self, client: &Client) -> Self {
        self.client = Some(ClientSnapshot::from(client));
        self
    }

    /// Whether any field is present.
    pub fn is_empty(&self) -> bool {
        self.promotor_name.is_none()
            && self.promotor_zona.is_none()
            && self.clientes_activos.is_none()
            && self.client.is_none()
    }
}

/// Merge the persona block with situational facts.
///
/// With an empty context the output is byte-identical to `persona`.
/// Otherwise a delimited section lists only the fields actually present,
/// in fixed order: operator name, region, active-client count, client
/// snapshot. Absent fields are omitted entirely.
pub fn build_instructions(persona: &str, ctx: &SituationalContext) -> String {
    if ctx.is_empty() {
        return persona.to_string();
    }

    let mut out = String::from(persona);
    out.push_str("\n\n## Contexto Actual\n");

    if let Some(name) = &ctx.promotor_name {
        out.push_str(&format!("- Promotor: {name}\n"));
    }
    if let Some(zona) = &ctx.promotor_zona {
        out.push_str(&format!("- Zona: {zona}\n"));
    }
    if let Some(count) = ctx.clientes_activos {
        out.push_str(&format!("- Clientes activos: {count}\n"));
    }
    if let Some(client) = &ctx.client {
        out.push_str(&format!("- Cliente actual: {}\n", client.render()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use copiloto_core::ClientStatus;

    const PERSONA: &str = "Eres el Copiloto.";

    #[test]
    fn empty_context_is_byte_identical_to_persona() {
        let ctx = SituationalContext::default();
        assert_eq!(build_instructions(PERSONA, &ctx), PERSONA);
    }

    #[test]
    fn only_region_appends_exactly_one_field() {
        let ctx = SituationalContext {
            promotor_zona: Some("Monterrey".into()),
            ..Default::default()
        };
        let out = build_instructions(PERSONA, &ctx);
        assert!(out.contains("- Zona: Monterrey"));
        assert!(!out.contains("Promotor:"));
        assert!(!out.contains("Clientes activos:"));
        assert!(!out.contains("Cliente actual:"));
        // exactly one bullet line
        assert_eq!(out.matches("\n- ").count(), 1);
    }

    #[test]
    fn full_context_keeps_fixed_field_order() {
        let ctx = SituationalContext {
            promotor_name: Some("Ana".into()),
            promotor_zona: Some("CDMX".into()),
            clientes_activos: Some(12),
            client: Some(ClientSnapshot {
                name: "Tortillería La Luz".into(),
                business_name: None,
                business_type: Some("alimentos".into()),
                status: Some("activo".into()),
            }),
        };
        let out = build_instructions(PERSONA, &ctx);
        let name_pos = out.find("Promotor:").unwrap();
        let zona_pos = out.find("Zona:").unwrap();
        let count_pos = out.find("Clientes activos:").unwrap();
        let client_pos = out.find("Cliente actual:").unwrap();
        assert!(name_pos < zona_pos && zona_pos < count_pos && count_pos < client_pos);
    }

    #[test]
    fn is_deterministic() {
        let ctx = SituationalContext {
            promotor_name: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(
            build_instructions(PERSONA, &ctx),
            build_instructions(PERSONA, &ctx)
        );
    }

    #[test]
    fn snapshot_from_client_row() {
        let client = Client {
            id: 1,
            promotor_id: 7,
            name: "Café Centro".into(),
            email: None,
            phone: None,
            business_name: Some("Café Centro SA".into()),
            business_type: Some("restaurante".into()),
            status: ClientStatus::Prospecto,
            notes: None,
            created_at: Utc::now(),
            last_contact: None,
        };
        let snapshot = ClientSnapshot::from(&client);
        let rendered = snapshot.render();
        assert!(rendered.contains("Café Centro SA"));
        assert!(rendered.contains("estado: prospecto"));
    }

    #[test]
    fn promoter_context_skips_missing_zona() {
        let promoter = Promoter {
            id: 7,
            email: "a@b.mx".into(),
            password_hash: "h".into(),
            name: "Ana".into(),
            role: "promotor".into(),
            zona: None,
            clientes_activos: 3,
            is_active: true,
            created_at: Utc::now(),
        };
        let ctx = SituationalContext::for_promoter(&promoter);
        let out = build_instructions(PERSONA, &ctx);
        assert!(out.contains("- Promotor: Ana"));
        assert!(out.contains("- Clientes activos: 3"));
        assert!(!out.contains("Zona:"));
    }
}
