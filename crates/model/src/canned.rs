//! Deterministic canned responder.
//!
//! Used when no API key is configured so development installs still get a
//! working conversation flow. Picks a themed response by keyword, otherwise
//! a generic greeting. Pure and synchronous under the hood; the async
//! signature only satisfies the trait.

use async_trait::async_trait;

use copiloto_core::error::ModelError;
use copiloto_core::model::{ModelClient, ModelReply, ModelRequest};

const DEV_NOTE: &str =
    "\n\n*Nota: Modo desarrollo - configura una clave de API para respuestas completas*";

const GREETING: &str = "Hola! Soy tu Copiloto. Estoy aqui para ayudarte a ser mas efectivo como promotor.\n\n\
Puedo ayudarte con:\n\
- Redactar mensajes para clientes\n\
- Explicar productos y servicios\n\
- Preparar propuestas de venta\n\
- Resolver dudas sobre procesos\n\n\
Como puedo ayudarte hoy?";

const CLIENT_HELP: &str = "Entiendo que quieres ayuda con un cliente. Aqui tienes algunas sugerencias:\n\n\
1. **Para primer contacto**: personaliza tu mensaje mencionando su industria\n\
2. **Para seguimiento**: ofrece valor antes de pedir algo\n\
3. **Para cierre**: enfocate en los beneficios especificos para su negocio\n\n\
Quieres que te ayude a redactar un mensaje especifico?";

const FEES_HELP: &str = "Sobre comisiones, recuerda estos puntos clave:\n\n\
- Las tarifas son competitivas frente a bancos tradicionales\n\
- Hay beneficios por volumen de transacciones\n\
- Las transferencias dentro de la plataforma son gratuitas\n\n\
Para detalles especificos, consulta la tabla de comisiones actualizada en tu portal.";

/// Deterministic keyword-driven responder.
pub struct CannedClient {
    name: String,
}

impl CannedClient {
    pub fn new() -> Self {
        Self {
            name: "canned".into(),
        }
    }

    /// Pick the response for the latest user message.
    fn respond(last_user_message: &str) -> String {
        let lower = last_user_message.to_lowercase();

        let body = if lower.contains("cliente") || lower.contains("prospecto") {
            CLIENT_HELP
        } else if lower.contains("comision")
            || lower.contains("comisión")
            || lower.contains("precio")
            || lower.contains("costo")
        {
            FEES_HELP
        } else {
            GREETING
        };

        format!("{body}{DEV_NOTE}")
    }
}

impl Default for CannedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for CannedClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: ModelRequest) -> Result<ModelReply, ModelError> {
        let last = request
            .turns
            .last()
            .map(|t| t.content.as_str())
            .unwrap_or_default();

        Ok(ModelReply {
            text: Self::respond(last),
            usage: None,
        })
    }
}
