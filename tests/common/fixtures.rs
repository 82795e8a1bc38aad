//! Java source fixtures shared by the integration tests.

/// A benchmark-style test case: parameter read and decoded, SQL built over
/// multiple lines, executed in the same method.
pub const SQLI_SAME_FILE: &str = r#"package org.owasp.benchmark.testcode;

import javax.servlet.http.HttpServletRequest;

public class BenchmarkTest01234 {
    public void doPost(HttpServletRequest request) throws Exception {
        String param = request.getParameter("input");
        param = java.net.URLDecoder.decode(param, "UTF-8");

        String sql = "SELECT * FROM users"
            + " WHERE name = '" + param + "'";

        java.sql.Statement stmt = connection.createStatement();
        stmt.execute(sql);
    }
}
"#;

/// A path-traversal case whose sink sits inside a try-with-resources header.
pub const PT_HEADER_FILE: &str = r#"package org.owasp.benchmark.testcode;

public class BenchmarkTest05678 {
    public void doPost() throws Exception {
        String param = request.getParameter("input");
        String bar = doSomething(param);
        String fileName = basePath + bar;
        try (
            java.io.FileInputStream fis = new java.io.FileInputStream(fileName);
        ) {
            fis.read();
        }
    }
}
"#;

/// A command-injection case building an argument vector.
pub const CMDI_FILE: &str = r#"package org.owasp.benchmark.testcode;

public class BenchmarkTest09999 {
    public void doPost() throws Exception {
        String param = request.getParameter("input");
        String bar = param;
        String[] args = {a1, a2, "echo " + bar};
        exec(args);
    }
}
"#;
