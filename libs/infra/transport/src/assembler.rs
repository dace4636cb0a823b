// [libs/infra/transport/src/assembler.rs]
/*!
 * =================================================================
 * APARATO: LINE FRAME ASSEMBLER (V5.1 - STALE SHIELD)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: REENSAMBLADO DE TRAMAS JSON FRAGMENTADAS
 *
 * El puente entrega bytes en ráfagas que pueden partir una trama JSON
 * en dos lecturas. Se mantiene un único buffer de línea con marca de
 * tiempo: si el fragmento retenido supera los 2 segundos se desecha,
 * impidiendo que un resto viejo contamine la siguiente trama sana.
 * =================================================================
 */

use std::time::{Duration, Instant};

/// Edad máxima del fragmento retenido antes de su desecho.
pub const STALE_BUFFER_AGE: Duration = Duration::from_secs(2);

/// Resultado de empujar una línea al reensamblador.
#[derive(Debug, PartialEq, Eq)]
pub enum AssemblerOutcome {
    /// La línea quedó retenida como fragmento incompleto.
    Buffered,
    /// Línea completa lista para despachar (con el fragmento previo
    /// antepuesto si lo había).
    Ready(String),
}

/// Buffer de reensamblado de una sola línea con protección de edad.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    fragment: String,
    fragment_held_since: Option<Instant>,
}

impl FrameAssembler {
    pub fn new() -> FrameAssembler {
        FrameAssembler::default()
    }

    /// Desecha el fragmento retenido si superó la edad máxima.
    /// Devuelve el contenido desechado para su registro forense.
    pub fn evict_stale(&mut self, now: Instant) -> Option<String> {
        if let Some(held_since) = self.fragment_held_since {
            if now.duration_since(held_since) > STALE_BUFFER_AGE {
                self.fragment_held_since = None;
                return Some(std::mem::take(&mut self.fragment));
            }
        }
        None
    }

    /// Procesa una línea entrante.
    ///
    /// Una línea que abre JSON (`{`) sin cerrarlo (`}`) se retiene como
    /// fragmento. En caso contrario el fragmento previo (si existe) se
    /// antepone y el resultado queda listo para despacho. Las líneas
    /// que no son JSON pasan sin alteración.
    pub fn push(&mut self, line: &str, now: Instant) -> AssemblerOutcome {
        if line.starts_with('{') && !line.trim_end().ends_with('}') {
            self.fragment.push_str(line);
            self.fragment_held_since = Some(now);
            return AssemblerOutcome::Buffered;
        }

        if self.fragment.is_empty() {
            return AssemblerOutcome::Ready(line.to_string());
        }

        let mut reassembled = std::mem::take(&mut self.fragment);
        self.fragment_held_since = None;
        reassembled.push_str(line);
        AssemblerOutcome::Ready(reassembled)
    }

    /// Re-retiene una línea completa que falló el parseo JSON sin
    /// cerrar llave: probablemente el resto llega en la próxima ráfaga.
    pub fn rebuffer(&mut self, line: String, now: Instant) {
        self.fragment = line;
        self.fragment_held_since = Some(now);
    }

    /// Vacía el fragmento retenido (trama malformada confirmada).
    pub fn clear(&mut self) {
        self.fragment.clear();
        self.fragment_held_since = None;
    }

    pub fn has_fragment(&self) -> bool {
        !self.fragment.is_empty()
    }
}
