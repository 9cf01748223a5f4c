mod breadcrumbs;
mod cipher;
mod pash_keys;
mod passwords;
mod pbkdf;
