//! One-shot prompt tools.
//!
//! Stateless helpers for drafting a client message or analyzing a sales
//! opportunity. Unlike [`Copilot::send_message`], nothing here touches a
//! thread: no history, no persistence, one model call per use.

use copiloto_core::error::{Error, Result};
use copiloto_core::model::ModelOutcome;

use crate::context::ClientSnapshot;
use crate::orchestrator::Copilot;

impl Copilot {
    /// Draft a professional message for a client about a purpose such as
    /// "seguimiento" or "propuesta comercial".
    pub async fn generate_client_message(
        &self,
        client: &ClientSnapshot,
        purpose: &str,
    ) -> Result<ModelOutcome> {
        if purpose.trim().is_empty() {
            return Err(Error::Validation("purpose must not be empty".into()));
        }

        let mut prompt = format!(
            "Redacta un mensaje profesional para el cliente {} con el siguiente proposito: {}.",
            client.name, purpose
        );
        if let Some(business) = &client.business_name {
            prompt.push_str(&format!(" El cliente opera el negocio {business}."));
        }
        if let Some(kind) = &client.business_type {
            prompt.push_str(&format!(" Giro del negocio: {kind}."));
        }
        prompt.push_str(
            " El mensaje debe ser breve, en espanol mexicano, listo para enviarse por WhatsApp.",
        );

        Ok(self.one_shot(prompt).await)
    }

    /// Analyze a described sales opportunity and suggest next steps.
    pub async fn analyze_opportunity(&self, description: &str) -> Result<ModelOutcome> {
        if description.trim().is_empty() {
            return Err(Error::Validation("description must not be empty".into()));
        }

        let prompt = format!(
            "Analiza la siguiente oportunidad de venta y sugiere los proximos pasos \
             concretos para el promotor. Incluye que producto ofrecer, que documentos \
             pedir y un posible siguiente contacto.\n\nOportunidad: {description}"
        );

        Ok(self.one_shot(prompt).await)
    }
}
