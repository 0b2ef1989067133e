use std::sync::Arc;

use html_escape::encode_text;
use tracing::instrument;

use crate::config::SiteConfig;
use crate::model::contractor::Contractor;
use crate::model::job::Job;
use crate::model::request::ServiceRequest;
use crate::pricing::PriceQuote;
use crate::util::email::{EmailError, EmailMessage, EmailService};

/// All outbound mail of the workflow: templates plus delivery through the
/// (optional) configured provider. Senders that are best-effort log at the
/// call site; the hard-requirement check is `is_configured`.
pub struct Notifier {
    mailer: Option<Arc<dyn EmailService>>,
    site: SiteConfig,
}

impl Notifier {
    pub fn new(mailer: Option<Arc<dyn EmailService>>, site: SiteConfig) -> Self {
        Notifier { mailer, site }
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        match &self.mailer {
            Some(mailer) => mailer.send_email(message).await,
            None => Err(EmailError::NotConfigured),
        }
    }

    /// Price-quote email with the confirmation link, sent to the customer
    /// right after intake.
    #[instrument(skip(self, request, price))]
    pub async fn send_quote_email(
        &self,
        request: &ServiceRequest,
        price: Option<&PriceQuote>,
        token: &str,
    ) -> Result<(), EmailError> {
        let to = request
            .email
            .clone()
            .ok_or_else(|| EmailError::AddressError("Customer has no email".to_string()))?;
        let url = self.site.confirm_url(token);

        let price_line = match price {
            Some(q) => match &q.price_range {
                Some(range) => format!("Your price: {} kr (range {} kr)", q.price, range),
                None => format!("Your price: {} kr", q.price),
            },
            None => "We will contact you with a price.".to_string(),
        };

        let text = format!(
            "Hello {name},\n\n\
             Thank you for your {service} request.\n\
             {price_line}\n\n\
             Confirm your booking within 7 days using this link:\n{url}\n\n\
             Best regards,\nKlarStäd",
            name = request.name,
            service = request.service,
            price_line = price_line,
            url = url,
        );
        let html = format!(
            "<p>Hello {name},</p>\
             <p>Thank you for your <strong>{service}</strong> request.</p>\
             <p>{price_line}</p>\
             <p><a href=\"{url}\">Confirm your booking</a> (the link is valid for 7 days).</p>\
             <p>Best regards,<br>KlarStäd</p>",
            name = encode_text(&request.name),
            service = encode_text(&request.service),
            price_line = encode_text(&price_line),
            url = encode_text(&url),
        );

        self.send(
            EmailMessage::new(to, format!("Your {} quote from KlarStäd", request.service))
                .with_text_body(text)
                .with_html_body(html),
        )
        .await
    }

    /// Admin notification about a new intake submission.
    #[instrument(skip(self, request, price))]
    pub async fn send_intake_admin_email(
        &self,
        request: &ServiceRequest,
        price: Option<&PriceQuote>,
    ) -> Result<(), EmailError> {
        let price_line = match price {
            Some(q) => format!("{} kr", q.price),
            None => "not computed".to_string(),
        };
        let text = format!(
            "New {service} request\n\n\
             Name: {name}\nPhone: {phone}\nEmail: {email}\n\
             City: {city}\nPrice: {price}",
            service = request.service,
            name = request.name,
            phone = request.phone,
            email = request.email.as_deref().unwrap_or("-"),
            city = request.city.as_deref().unwrap_or("-"),
            price = price_line,
        );
        self.send(
            EmailMessage::new(
                self.site.admin_email.clone(),
                format!("New request: {}", request.service),
            )
            .with_text_body(text),
        )
        .await
    }

    /// Booking-confirmed notice to the customer.
    #[instrument(skip(self, request))]
    pub async fn send_booking_confirmed_email(
        &self,
        request: &ServiceRequest,
    ) -> Result<(), EmailError> {
        let to = request
            .email
            .clone()
            .ok_or_else(|| EmailError::AddressError("Customer has no email".to_string()))?;
        let text = format!(
            "Hello {name},\n\n\
             Your {service} booking is confirmed. We will be in touch about the schedule.\n\n\
             Best regards,\nKlarStäd",
            name = request.name,
            service = request.service,
        );
        let html = format!(
            "<p>Hello {name},</p>\
             <p>Your <strong>{service}</strong> booking is confirmed. \
             We will be in touch about the schedule.</p>\
             <p>Best regards,<br>KlarStäd</p>",
            name = encode_text(&request.name),
            service = encode_text(&request.service),
        );
        self.send(
            EmailMessage::new(to, "Your booking is confirmed".to_string())
                .with_text_body(text)
                .with_html_body(html),
        )
        .await
    }

    /// Booking-confirmed notice to the admin inbox.
    #[instrument(skip(self, request))]
    pub async fn send_booking_confirmed_admin_email(
        &self,
        request: &ServiceRequest,
    ) -> Result<(), EmailError> {
        let text = format!(
            "Booking confirmed\n\n\
             Service: {service}\nName: {name}\nPhone: {phone}\nEmail: {email}",
            service = request.service,
            name = request.name,
            phone = request.phone,
            email = request.email.as_deref().unwrap_or("-"),
        );
        self.send(
            EmailMessage::new(
                self.site.admin_email.clone(),
                format!("Booking confirmed: {}", request.service),
            )
            .with_text_body(text),
        )
        .await
    }

    /// Job offer with the contractor confirmation link.
    #[instrument(skip(self, contractor, job), fields(contractor = %contractor.name))]
    pub async fn send_job_offer_email(
        &self,
        contractor: &Contractor,
        job: &Job,
        token: &str,
    ) -> Result<(), EmailError> {
        let to = contractor
            .usable_email()
            .ok_or_else(|| EmailError::AddressError("Contractor has no email".to_string()))?
            .to_string();
        let url = self.site.contractor_confirm_url(token);
        let date = job.scheduled_date.as_deref().unwrap_or("Not specified");

        let text = format!(
            "Hello {name},\n\n\
             A new {job_type} job is available.\n\
             Address: {address}\nDate: {date}\nYour pay: {price}\n\n\
             First to confirm gets the job. Confirm here within 7 days:\n{url}\n\n\
             KlarStäd",
            name = contractor.name,
            job_type = job.job_type,
            address = job.address,
            date = date,
            price = job.price_display(),
            url = url,
        );
        let html = format!(
            "<p>Hello {name},</p>\
             <p>A new <strong>{job_type}</strong> job is available.</p>\
             <ul><li>Address: {address}</li><li>Date: {date}</li>\
             <li>Your pay: {price}</li></ul>\
             <p>First to confirm gets the job. \
             <a href=\"{url}\">Confirm here</a> (valid for 7 days).</p>\
             <p>KlarStäd</p>",
            name = encode_text(&contractor.name),
            job_type = encode_text(&job.job_type),
            address = encode_text(&job.address),
            date = encode_text(date),
            price = encode_text(&job.price_display()),
            url = encode_text(&url),
        );

        self.send(
            EmailMessage::new(to, format!("New job: {}", job.job_type))
                .with_text_body(text)
                .with_html_body(html),
        )
        .await
    }

    /// Confirmation notice to the contractor who won the job.
    #[instrument(skip(self, contractor, job), fields(contractor = %contractor.name))]
    pub async fn send_job_confirmed_email(
        &self,
        contractor: &Contractor,
        job: &Job,
    ) -> Result<(), EmailError> {
        let to = contractor
            .usable_email()
            .ok_or_else(|| EmailError::AddressError("Contractor has no email".to_string()))?
            .to_string();
        let text = format!(
            "Hello {name},\n\n\
             The {job_type} job at {address} is yours.\n\
             Date: {date}\nPay: {price}\n\n\
             KlarStäd",
            name = contractor.name,
            job_type = job.job_type,
            address = job.address,
            date = job.scheduled_date.as_deref().unwrap_or("Not specified"),
            price = job.price_display(),
        );
        self.send(
            EmailMessage::new(to, format!("Job confirmed: {}", job.job_type))
                .with_text_body(text),
        )
        .await
    }

    /// Admin notice about which contractor took a job.
    #[instrument(skip(self, contractor, job), fields(contractor = %contractor.name))]
    pub async fn send_job_confirmed_admin_email(
        &self,
        contractor: &Contractor,
        job: &Job,
    ) -> Result<(), EmailError> {
        let text = format!(
            "Job taken\n\n\
             Job: {job_type}\nAddress: {address}\nDate: {date}\nPay: {price}\n\
             Contractor: {name} ({email})",
            job_type = job.job_type,
            address = job.address,
            date = job.scheduled_date.as_deref().unwrap_or("Not specified"),
            price = job.price_display(),
            name = contractor.name,
            email = contractor.email.as_deref().unwrap_or("-"),
        );
        self.send(
            EmailMessage::new(
                self.site.admin_email.clone(),
                format!("Job taken: {}", job.job_type),
            )
            .with_text_body(text),
        )
        .await
    }
}
