// Two transports: real SMTP when the `smtp` feature is enabled, and a stub that
// only logs when it's not. A mailer built without SMTP configuration also logs.

use std::sync::Arc;

use crate::config::{OrgConfig, SmtpConfig};
use crate::receipt::{format_inr, ReceiptData};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("delivery failed: {0}")]
    Send(String),
}

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

#[cfg(feature = "smtp")]
mod real {
    use super::{MailError, OutgoingEmail};
    use crate::config::SmtpConfig;
    use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

    pub struct Transport {
        inner: AsyncSmtpTransport<Tokio1Executor>,
    }

    impl Transport {
        pub fn new(cfg: &SmtpConfig) -> Result<Self, MailError> {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                .map_err(|e| MailError::Send(e.to_string()))?
                .port(cfg.port);
            if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
                builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
            }
            Ok(Self { inner: builder.build() })
        }

        pub async fn send(&self, from: &str, email: &OutgoingEmail) -> Result<(), MailError> {
            let from: Mailbox = from.parse().map_err(|e| MailError::Address(format!("{}", e)))?;
            let to: Mailbox = email.to.parse().map_err(|e| MailError::Address(format!("{}", e)))?;
            let text = SinglePart::plain(email.body.clone());
            let builder = Message::builder().from(from).to(to).subject(email.subject.clone());
            let message = match &email.attachment {
                Some(att) => {
                    let content_type = ContentType::parse(&att.content_type)
                        .map_err(|e| MailError::Send(e.to_string()))?;
                    builder.multipart(
                        MultiPart::mixed()
                            .singlepart(text)
                            .singlepart(Attachment::new(att.filename.clone()).body(att.bytes.clone(), content_type)),
                    )
                }
                None => builder.singlepart(text),
            }
            .map_err(|e| MailError::Send(e.to_string()))?;

            self.inner
                .send(message)
                .await
                .map_err(|e| MailError::Send(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(not(feature = "smtp"))]
mod stub {
    use super::{MailError, OutgoingEmail};
    use crate::config::SmtpConfig;

    pub struct Transport;

    impl Transport {
        pub fn new(cfg: &SmtpConfig) -> Result<Self, MailError> {
            tracing::warn!(
                "SMTP host {} configured but the `smtp` feature is disabled; mail will only be logged",
                cfg.host
            );
            Ok(Self)
        }

        pub async fn send(&self, from: &str, email: &OutgoingEmail) -> Result<(), MailError> {
            super::log_only(from, email);
            Ok(())
        }
    }
}

#[cfg(feature = "smtp")]
use real::Transport;
#[cfg(not(feature = "smtp"))]
use stub::Transport;

fn log_only(from: &str, email: &OutgoingEmail) {
    tracing::info!(
        from,
        to = %email.to,
        subject = %email.subject,
        attachment = email.attachment.as_ref().map(|a| a.filename.as_str()).unwrap_or("-"),
        "mail delivery disabled, message logged"
    );
}

struct Configured {
    transport: Transport,
    from: String,
    admin_email: Option<String>,
}

#[derive(Clone)]
pub struct Mailer {
    configured: Option<Arc<Configured>>,
}

impl Mailer {
    pub fn disabled() -> Self {
        Self { configured: None }
    }

    pub fn from_config(cfg: Option<&SmtpConfig>) -> Result<Self, MailError> {
        let Some(cfg) = cfg else {
            return Ok(Self::disabled());
        };
        Ok(Self {
            configured: Some(Arc::new(Configured {
                transport: Transport::new(cfg)?,
                from: cfg.from.clone(),
                admin_email: cfg.admin_email.clone(),
            })),
        })
    }

    pub fn admin_email(&self) -> Option<&str> {
        self.configured.as_ref().and_then(|c| c.admin_email.as_deref())
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        match &self.configured {
            Some(c) => c.transport.send(&c.from, email).await,
            None => {
                log_only("-", email);
                Ok(())
            }
        }
    }
}

fn receipt_attachment(data: &ReceiptData, pdf: Option<&[u8]>) -> Option<MailAttachment> {
    pdf.map(|bytes| MailAttachment {
        filename: format!("{}.pdf", data.receipt_number),
        content_type: "application/pdf".to_string(),
        bytes: bytes.to_vec(),
    })
}

pub fn donor_confirmation(
    data: &ReceiptData,
    org: &OrgConfig,
    pdf: Option<&[u8]>,
    receipt_url: Option<&str>,
) -> OutgoingEmail {
    let mut body = format!(
        "Dear {},\n\nThank you for your generous donation of Rs. {} to {}.\n\n\
         Receipt number: {}\nTransaction ID: {}\nDate: {}\n",
        data.donor_name,
        format_inr(data.amount_paise),
        org.name,
        data.receipt_number,
        data.payment_id,
        data.date.format("%d/%m/%Y"),
    );
    match (pdf.is_some(), receipt_url) {
        (true, _) => body.push_str("\nYour receipt is attached to this email.\n"),
        (false, Some(url)) => body.push_str(&format!("\nYou can download your receipt here: {}\n", url)),
        (false, None) => {}
    }
    body.push_str(&format!("\nWith gratitude,\n{}\n", org.name));

    OutgoingEmail {
        to: data.email.clone(),
        subject: format!("Thank you for your donation - {}", data.receipt_number),
        body,
        attachment: receipt_attachment(data, pdf),
    }
}

pub fn admin_notification(data: &ReceiptData, admin: &str, pdf: Option<&[u8]>) -> OutgoingEmail {
    let body = format!(
        "New donation received.\n\nDonor: {}\nEmail: {}\nPhone: {}\nPAN: {}\nAmount: Rs. {}\n\
         Method: {}\nPayment ID: {}\nOrder ID: {}\nReceipt: {}\n",
        data.donor_name,
        data.email,
        data.phone.as_deref().unwrap_or("-"),
        data.pan.as_deref().unwrap_or("-"),
        format_inr(data.amount_paise),
        data.payment_method,
        data.payment_id,
        data.order_id,
        data.receipt_number,
    );
    OutgoingEmail {
        to: admin.to_string(),
        subject: format!("New donation: Rs. {} from {}", format_inr(data.amount_paise), data.donor_name),
        body,
        attachment: receipt_attachment(data, pdf),
    }
}
