use super::sendmail::send_email;
use crate::config::Config;

/// First-contact email for accounts created implicitly during a listing
/// submission. Carries the generated password; the user is expected to
/// change it on first login.
pub async fn send_new_account_email(
    config: &Config,
    to_email: &str,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Sua conta foi criada";
    let html_body = format!(
        "<html><body>\
         <h2>Bem-vindo(a), {username}!</h2>\
         <p>Criamos uma conta para voc\u{ea} ao publicar seu an\u{fa}ncio.</p>\
         <p>Sua senha tempor\u{e1}ria: <strong>{password}</strong></p>\
         <p>Recomendamos alterar a senha no primeiro acesso.</p>\
         </body></html>"
    );

    send_email(config, to_email, subject, &html_body).await
}
