// src/services/notification.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::error::AppError;
use crate::domain::currency::format_brl;
use crate::models::requisition::Requisition;
use crate::models::ut;

/// Dados do e-mail de confirmação enviado após o envio ao financeiro.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceConfirmation {
    pub recipient: String,
    pub rq: String,
    pub nota_fiscal: String,
    pub data_emissao: NaiveDate,
    pub fornecedor: String,
    pub ut: String,
    pub valor_nf: Decimal,
    pub oc: String,
}

impl InvoiceConfirmation {
    /// `None` quando a requisição ainda não tem os dados da nota gravados.
    pub fn from_requisition(recipient: &str, requisition: &Requisition) -> Option<Self> {
        Some(Self {
            recipient: recipient.to_string(),
            rq: requisition.rq.clone(),
            nota_fiscal: requisition.nota_fiscal.clone()?,
            data_emissao: requisition.data_emissao?,
            fornecedor: requisition.fornecedor.clone(),
            ut: requisition.ut.clone(),
            valor_nf: requisition.valor_nf?,
            oc: requisition.oc.clone()?,
        })
    }

    pub fn subject(&self) -> String {
        format!("Nota Fiscal {} enviada ao financeiro", self.nota_fiscal)
    }

    pub fn html(&self) -> String {
        format!(
            "<h2>Nota Fiscal enviada ao financeiro</h2>\
             <p>A requisição <strong>{rq}</strong> foi enviada para lançamento.</p>\
             <ul>\
             <li><strong>Número da NF:</strong> {nf}</li>\
             <li><strong>Data de emissão:</strong> {data}</li>\
             <li><strong>Fornecedor:</strong> {fornecedor}</li>\
             <li><strong>UT:</strong> {ut}</li>\
             <li><strong>Valor da NF:</strong> {valor}</li>\
             <li><strong>OC:</strong> {oc}</li>\
             </ul>",
            rq = escape(&self.rq),
            nf = escape(&self.nota_fiscal),
            data = self.data_emissao.format("%d/%m/%Y"),
            fornecedor = escape(&self.fornecedor),
            ut = escape(ut::describe(&self.ut)),
            valor = format_brl(self.valor_nf),
            oc = escape(&self.oc),
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_confirmation(&self, confirmation: &InvoiceConfirmation) -> Result<(), AppError>;
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    to: &'a str,
    subject: String,
    html: String,
}

/// Envia o e-mail por um endpoint HTTP (`POST {to, subject, html}` com bearer).
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl HttpNotifier {
    pub fn new(client: reqwest::Client, url: &str, key: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_confirmation(&self, confirmation: &InvoiceConfirmation) -> Result<(), AppError> {
        let body = EmailRequest {
            to: &confirmation.recipient,
            subject: confirmation.subject(),
            html: confirmation.html(),
        };
        self.client
            .post(&self.url)
            .bearer_auth(&self.key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Usado quando nenhum endpoint de e-mail está configurado.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_confirmation(&self, confirmation: &InvoiceConfirmation) -> Result<(), AppError> {
        tracing::info!(
            "✉️  Confirmação da NF {} para {} (envio de e-mail não configurado)",
            confirmation.nota_fiscal,
            confirmation.recipient
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmation() -> InvoiceConfirmation {
        InvoiceConfirmation {
            recipient: "joana@empresa.com".into(),
            rq: "RQ001".into(),
            nota_fiscal: "123456".into(),
            data_emissao: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            fornecedor: "ACME <Ltda>".into(),
            ut: "020-johnson-projetos-sjc".into(),
            valor_nf: Decimal::new(123456, 2),
            oc: "OC789".into(),
        }
    }

    #[test]
    fn html_lists_invoice_fields_in_display_form() {
        let html = confirmation().html();
        assert!(html.contains("123456"));
        assert!(html.contains("10/01/2024"));
        assert!(html.contains("R$ 1.234,56"));
        assert!(html.contains("OC789"));
        assert!(html.contains("ACME &lt;Ltda&gt;"));
    }

    #[test]
    fn subject_names_the_invoice() {
        assert_eq!(confirmation().subject(), "Nota Fiscal 123456 enviada ao financeiro");
    }
}
