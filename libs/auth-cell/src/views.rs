use axum::response::Html;

use shared_models::flash::Flash;
use shared_utils::html::render_page;

pub fn index_page(flashes: &[Flash]) -> Html<String> {
    let body = r#"<p>Book appointments with our doctors and keep track of your diagnoses in one place.</p>
<p><a href="/login">Log in</a> or <a href="/register">create an account</a> to get started.</p>"#;

    render_page("Welcome", None, flashes, body)
}

pub fn register_page(flashes: &[Flash]) -> Html<String> {
    let body = r#"<form method="post" action="/register">
<label>Name <input type="text" name="name" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Age <input type="number" name="age" min="0" required></label>
<label>Gender
<select name="gender" required>
<option value="female">Female</option>
<option value="male">Male</option>
<option value="other">Other</option>
</select></label>
<label>Role
<select name="role" required>
<option value="patient">Patient</option>
<option value="doctor">Doctor</option>
</select></label>
<label>Specialization (doctors only) <input type="text" name="specialization"></label>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Log in</a>.</p>"#;

    render_page("Register", None, flashes, body)
}

pub fn login_page(flashes: &[Flash]) -> Html<String> {
    let body = r#"<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Role
<select name="role" required>
<option value="patient">Patient</option>
<option value="doctor">Doctor</option>
</select></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a>.</p>"#;

    render_page("Log in", None, flashes, body)
}
