//! Fixed Vite + React project scaffold written into each work directory.

use std::path::Path;

use serde_json::json;

use super::ExportError;

/// Package name of every exported project.
pub const PACKAGE_NAME: &str = "downloaded-layout";

const VITE_CONFIG: &str = "import { defineConfig } from 'vite';
import react from '@vitejs/plugin-react';

export default defineConfig({
  plugins: [react()],
  css: {
    modules: {
      localsConvention: 'camelCaseOnly',
    },
  },
  build: {
    outDir: 'dist',
    assetsDir: 'assets',
  },
  // Relative so the bundle runs from any location.
  base: './',
});
";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <link rel="icon" type="image/svg+xml" href="./vite.svg" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Downloaded Layout</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>
"#;

const VITE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;

const CSS_MODULE_DECLARATIONS: &str = "// Declaration for CSS Modules (.css, .scss, .sass)
declare module '*.module.css' {
  const classes: { readonly [key: string]: string };
  export default classes;
}

declare module '*.module.scss' {
  const classes: { readonly [key: string]: string };
  export default classes;
}

declare module '*.module.sass' {
  const classes: { readonly [key: string]: string };
  export default classes;
}
";

const MAIN_HEAD: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';
";

const MAIN_STYLES_IMPORT: &str = "import './styles/styles.css';
";

const MAIN_BODY: &str = "
ReactDOM.createRoot(document.getElementById('root')!).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
";

/// Write every scaffold file that does not depend on the copied sources.
///
/// # Errors
///
/// Returns `Write` for the first file that cannot be written, or
/// `Serialise` if a JSON descriptor fails to render.
pub fn write_scaffold(dir: &Path) -> Result<(), ExportError> {
    write_file(&dir.join("package.json"), &serde_json::to_string_pretty(&package_json())?)?;
    write_file(&dir.join("vite.config.js"), VITE_CONFIG)?;
    write_file(&dir.join("tsconfig.json"), &serde_json::to_string_pretty(&tsconfig())?)?;
    write_file(&dir.join("tsconfig.node.json"), &serde_json::to_string_pretty(&tsconfig_node())?)?;
    write_file(&dir.join("index.html"), INDEX_HTML)?;
    write_file(&dir.join("public").join("vite.svg"), VITE_SVG)?;
    write_file(&dir.join("src").join("custom.d.ts"), CSS_MODULE_DECLARATIONS)?;
    Ok(())
}

/// Write `src/main.tsx`, importing the global sheet only when it was copied.
///
/// # Errors
///
/// Returns `Write` when the file cannot be written.
pub fn write_main(dir: &Path, with_global_styles: bool) -> Result<(), ExportError> {
    write_file(&dir.join("src").join("main.tsx"), &main_tsx(with_global_styles))
}

#[must_use]
pub fn main_tsx(with_global_styles: bool) -> String {
    let mut out = String::from(MAIN_HEAD);
    if with_global_styles {
        out.push_str(MAIN_STYLES_IMPORT);
    }
    out.push_str(MAIN_BODY);
    out
}

#[must_use]
pub fn package_json() -> serde_json::Value {
    json!({
        "name": PACKAGE_NAME,
        "private": true,
        "version": "0.0.1",
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "tsc && vite build",
            "preview": "vite preview",
        },
        "dependencies": {
            "react": "^18.2.0",
            "react-dom": "^18.2.0",
        },
        "devDependencies": {
            "@types/react": "^18.0.27",
            "@types/react-dom": "^18.0.10",
            "@vitejs/plugin-react": "^4.0.0",
            "typescript": "^5.0.0",
            "vite": "^4.5.0",
            "sass": "^1.60.0",
        },
    })
}

fn tsconfig() -> serde_json::Value {
    json!({
        "compilerOptions": {
            "target": "ESNext",
            "useDefineForClassFields": true,
            "lib": ["DOM", "DOM.Iterable", "ESNext"],
            "allowJs": false,
            "skipLibCheck": true,
            "esModuleInterop": true,
            "allowSyntheticDefaultImports": true,
            "strict": true,
            "forceConsistentCasingInFileNames": true,
            "module": "ESNext",
            "moduleResolution": "Node",
            "resolveJsonModule": true,
            "isolatedModules": true,
            "noEmit": true,
            "jsx": "react-jsx",
            "baseUrl": ".",
            "paths": { "@interfaces/*": ["./src/interfaces/*"] },
        },
        "include": ["src", "vite.config.js"],
        "references": [{ "path": "./tsconfig.node.json" }],
    })
}

fn tsconfig_node() -> serde_json::Value {
    json!({
        "compilerOptions": {
            "composite": true,
            "skipLibCheck": true,
            "module": "ESNext",
            "moduleResolution": "bundler",
            "allowSyntheticDefaultImports": true,
        },
        "include": ["vite.config.js"],
    })
}

/// Write `contents` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Write { path: parent.to_path_buf(), source })?;
    }
    std::fs::write(path, contents).map_err(|source| ExportError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
